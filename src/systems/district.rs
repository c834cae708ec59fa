// this is the entry point for the district generation plugin
use bevy::math::DVec2;
use bevy::prelude::*;

use block_massing_gen::config::*;
use block_massing_gen::generation::massing::{Tier, Volume};
use block_massing_gen::generation::pipeline::{District, GenerationParams, SiteInput, demo_site, generate_district};
use block_massing_gen::{Segment, export, mesh};

// resources
#[derive(Resource)]
pub struct Seed(pub u64);

#[derive(Resource)]
pub struct Params(pub GenerationParams);

#[derive(Resource)]
pub struct Site(pub SiteInput);

#[derive(Resource, Default)]
pub struct CurrentDistrict(pub Option<District>);

// message of the last rejected configuration
#[derive(Resource, Default)]
pub struct LastError(pub Option<String>);

#[derive(Resource)]
pub struct GizmosVisible(pub bool);

// Event for regeneration
#[derive(Event)]
pub struct RegenerateEvent {
    pub seed: u64,
}

// export event
#[derive(Event)]
pub struct ExportEvent {
    pub filename: String,
}

// root of every spawned district entity
#[derive(Component)]
pub struct DistrictRoot;

#[derive(Component)]
pub struct BuildingMass {
    pub tier: Option<Tier>,
    pub far: f64,
}

// main plugin for generation
pub struct DistrictPlugin;

impl Plugin for DistrictPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Seed(INITIAL_SEED))
            .insert_resource(Params(GenerationParams::default()))
            .insert_resource(Site(demo_site(SITE_WIDTH, SITE_DEPTH)))
            .insert_resource(CurrentDistrict::default())
            .insert_resource(LastError::default())
            .insert_resource(GizmosVisible(true))
            .add_event::<RegenerateEvent>()
            .add_event::<ExportEvent>()
            .add_systems(Startup, |seed: Res<Seed>, mut events: EventWriter<RegenerateEvent>| {
                events.write(RegenerateEvent { seed: seed.0 });
            })
            .add_systems(Update, (handle_regeneration, handle_export, district_gizmos));
    }
}

fn to_world(p: DVec2, y: f32) -> Vec3 {
    Vec3::new(p.x as f32, y, p.y as f32)
}

fn tier_color(tier: Option<Tier>) -> Color {
    match tier {
        Some(Tier::Low) => Color::srgb(0.85, 0.82, 0.74),
        Some(Tier::Mid) => Color::srgb(0.72, 0.78, 0.88),
        Some(Tier::High) => Color::srgb(0.55, 0.62, 0.80),
        None => Color::srgb(0.4, 0.4, 0.4),
    }
}

pub fn handle_regeneration(
    mut commands: Commands,
    mut events: EventReader<RegenerateEvent>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut seed: ResMut<Seed>,
    mut params: ResMut<Params>,
    site: Res<Site>,
    mut current: ResMut<CurrentDistrict>,
    mut last_error: ResMut<LastError>,
    query: Query<Entity, With<DistrictRoot>>,
) {
    // slider drags queue several events per frame, only the last one matters
    let Some(event) = events.read().last() else {
        return;
    };

    // cleanup existing district
    for entity in query.iter() {
        commands.entity(entity).try_despawn();
    }

    seed.0 = event.seed;
    params.0.seed = event.seed;

    match generate_district(&site.0, &params.0) {
        Ok(district) => {
            spawn_district(&mut commands, &mut meshes, &mut materials, &district);
            if !district.diagnostics.is_empty() {
                debug!("{} diagnostics: {:?}", district.diagnostics.len(), district.diagnostics);
            }
            current.0 = Some(district);
            last_error.0 = None;
        }
        Err(err) => {
            warn!("generation rejected: {}", err);
            current.0 = None;
            last_error.0 = Some(err.to_string());
        }
    }
}

fn spawn_district(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    district: &District,
) {
    let root = commands
        .spawn((DistrictRoot, Transform::default(), Visibility::default()))
        .id();

    let ground = materials.add(StandardMaterial {
        base_color: Color::srgb(0.22, 0.24, 0.22),
        alpha_mode: AlphaMode::Opaque,
        ..default()
    });
    let tower = materials.add(StandardMaterial {
        base_color: Color::srgb(0.92, 0.60, 0.42),
        alpha_mode: AlphaMode::Opaque,
        ..default()
    });
    let tiers = [None, Some(Tier::Low), Some(Tier::Mid), Some(Tier::High)].map(|tier| {
        (
            tier,
            materials.add(StandardMaterial {
                base_color: tier_color(tier),
                alpha_mode: AlphaMode::Opaque,
                ..default()
            }),
        )
    });
    let material_for = |tier: Option<Tier>| {
        tiers
            .iter()
            .find(|(t, _)| *t == tier)
            .map(|(_, m)| m.clone())
            .unwrap_or_else(|| ground.clone())
    };

    let mut children = Vec::new();
    for block in district.blocks() {
        children.push(
            commands
                .spawn((
                    Mesh3d(meshes.add(mesh::footprint_mesh(block.polygon(), 0.01))),
                    MeshMaterial3d(ground.clone()),
                    Transform::default(),
                ))
                .id(),
        );
    }

    let mut spawn_volume = |volume: &Volume, material: Handle<StandardMaterial>, mass: BuildingMass| {
        commands
            .spawn((
                mass,
                Mesh3d(meshes.add(mesh::volume_mesh(volume))),
                MeshMaterial3d(material),
                Transform::default(),
            ))
            .id()
    };
    for massing in &district.massing {
        for building in &massing.buildings {
            let mass = || BuildingMass { tier: building.tier, far: building.far };
            if let Some(structure) = &building.structure {
                children.push(spawn_volume(structure, material_for(building.tier), mass()));
            }
            for t in building.primary_tower.iter().chain(building.secondary_tower.iter()) {
                children.push(spawn_volume(t, tower.clone(), mass()));
            }
        }
    }

    commands.entity(root).add_children(&children);
}

pub fn handle_export(mut events: EventReader<ExportEvent>, current: Res<CurrentDistrict>) {
    for event in events.read() {
        let Some(district) = &current.0 else {
            warn!("nothing to export");
            continue;
        };
        match export::export_obj(district, &event.filename) {
            Ok(count) => info!("export successful: {} ({} volumes)", event.filename, count),
            Err(e) => error!("export failed: {}", e),
        }
    }
}

fn draw_lines(gizmos: &mut Gizmos, lines: &[Segment], y: f32, color: Color) {
    for line in lines {
        gizmos.line(to_world(line.start, y), to_world(line.end, y), color);
    }
}

fn draw_ring(gizmos: &mut Gizmos, ring: &[DVec2], y: f32, color: Color) {
    for i in 0..ring.len() {
        let next = (i + 1) % ring.len();
        gizmos.line(to_world(ring[i], y), to_world(ring[next], y), color);
    }
}

fn district_gizmos(
    mut gizmos: Gizmos,
    site: Res<Site>,
    current: Res<CurrentDistrict>,
    visible: Res<GizmosVisible>,
) {
    if !visible.0 {
        return;
    }

    draw_ring(&mut gizmos, &site.0.boundary, 0.05, Color::srgba(0.71, 0.24, 0.24, 0.9));
    draw_lines(&mut gizmos, &site.0.primary_roads, 0.1, Color::srgba(0.9, 0.3, 0.3, 0.9));

    let Some(district) = &current.0 else {
        return;
    };
    draw_lines(&mut gizmos, &district.subdivision.coarse_lines, 0.08, Color::srgba(0.95, 0.6, 0.2, 0.8));
    draw_lines(&mut gizmos, &district.subdivision.fine_lines, 0.06, Color::srgba(0.9, 0.85, 0.3, 0.6));
    for outline in district.pedestrian_outlines() {
        draw_ring(&mut gizmos, outline, 0.04, Color::srgba(0.24, 0.55, 0.31, 0.9));
    }
}
