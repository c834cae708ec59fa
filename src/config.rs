// Configuration file, all measurements in site units (1 unit = 1 meter)
// These are the default generation parameters, every one of them can be
// overridden through the parameter structs in `generation`

// Geometric tolerance handed to every primitive call
pub const TOLERANCE: f64 = 0.001;

pub const INITIAL_SEED: u64 = 1512086461918454205;

// Coarse subdivision pass (produces the secondary road network)
pub const COARSE_AREA_THRESHOLD: f64 = 20_000.0; // m2
pub const COARSE_DISTANCE_CUTOFF: f64 = 120.0;   // distance to primary road
pub const COARSE_AMPLIFICATION: f64 = 0.2;
pub const COARSE_CENTER_JITTER: f64 = 10.0;      // radius around the centroid

// Fine subdivision pass (produces the tertiary road network)
pub const FINE_AREA_THRESHOLD: f64 = 6_000.0;
pub const FINE_DISTANCE_CUTOFF: f64 = 80.0;
pub const FINE_AMPLIFICATION: f64 = 0.3;
pub const FINE_CENTER_JITTER: f64 = 5.0;

// Shape correction trigger, longest edge / shortest edge
pub const LENGTH_RATIO: f64 = 3.0;
// Split point perturbation around an edge midpoint, fraction of edge parameter
pub const SPLIT_JITTER: f64 = 0.1;
// Hard cap on loop iterations per pass, guards against non-convergence
pub const MAX_PASS_ITERATIONS: usize = 64;

// Setbacks
pub const ROAD_A_HALF_WIDTH: f64 = 12.0;
pub const ROAD_B_HALF_WIDTH: f64 = 8.0;
pub const ROAD_OTHER_HALF_WIDTH: f64 = 5.0;
pub const PEDESTRIAN_OFFSET: f64 = 3.0;
pub const SETBACK_EXTENSION: f64 = 10.0; // cutter lines are extended this much past each end

// Height bands, distances must increase, heights must not
pub const PRIMARY_BANDS: [f64; 3] = [60.0, 120.0, 200.0];
pub const PRIMARY_HEIGHTS: [f64; 3] = [30.0, 20.0, 10.0];
pub const COARSE_BANDS: [f64; 3] = [30.0, 60.0, 100.0];
pub const COARSE_HEIGHTS: [f64; 3] = [20.0, 12.0, 6.0];
pub const FINE_BANDS: [f64; 3] = [15.0, 30.0, 60.0];
pub const FINE_HEIGHTS: [f64; 3] = [10.0, 6.0, 3.0];
pub const CLASS_WEIGHTS: [f64; 3] = [0.5, 0.3, 0.2];

// Density scalar -> FAR
pub const FAR_SCALE: f64 = 0.5;
pub const FAR_MIN: f64 = 0.5;
pub const FAR_MAX: f64 = 20.0;

// Massing, building coverage ratios per FAR tier (low, mid, high)
pub const TIER_DENSITIES: [f64; 3] = [0.6, 0.5, 0.6];
pub const TOWER_RATIO: f64 = 0.6;           // primary tower share of residual floor area
pub const FLOOR_HEIGHT: f64 = 3.0;
pub const BORDER_WIDTH: f64 = 2.0;          // outer border around mid/high tier footprints
pub const HIGH_TIER_BASE_FLOORS: u32 = 5;
pub const PRIMARY_ADJACENCY: f64 = 30.0;    // edge midpoint to primary road
pub const SECONDARY_ADJACENCY: f64 = 15.0;  // edge midpoint to secondary road
pub const TOWER_EXTENSION: f64 = 20.0;
pub const MAX_GRID_SPANS: usize = 64;     // per axis, reached only far below the low tier

// Demo site used by the viewer
pub const SITE_WIDTH: f64 = 400.0;
pub const SITE_DEPTH: f64 = 300.0;
