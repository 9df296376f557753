// Shared tuning constants used by the deformation core and the web frontend.

// Elastic deformation
pub const DEFORM_THROTTLE_MS: f32 = 16.67; // cap apply-deformation at ~60 updates/sec
pub const DEFORM_RADIUS: f32 = 3.0; // world-space influence radius around the grab point
pub const DEFORM_STRENGTH: f32 = 0.8;
pub const RETURN_SPRING: f32 = 0.2;
pub const RETURN_DAMPING: f32 = 0.75;
pub const RETURN_LERP_FACTOR: f32 = 0.2; // out-of-radius relaxation toward rest
pub const GRAB_LERP_FACTOR: f32 = 0.6; // blend toward the pulled target per apply
pub const VELOCITY_THRESHOLD: f32 = 0.001;
pub const DISTANCE_THRESHOLD: f32 = 0.001;
pub const MAX_RETURN_TICKS: u32 = 600; // force-snap if the spring never settles

// Interaction thresholds (CSS pixels)
pub const STRETCH_INITIAL_THRESHOLD: f32 = 50.0; // drag distance before the first stretch cue
pub const STRETCH_SUBSEQUENT_THRESHOLD: f32 = 100.0;
pub const RELEASE_DISTANCE_THRESHOLD: f32 = 300.0; // distance from screen center for the release cue
pub const CLICK_WINDOW_MS: u64 = 500;
pub const CLICKS_FOR_ALT_CUE: u32 = 3;
pub const STRETCH_CUE_COUNT: usize = 5;
pub const STRETCH_CUE_VOLUME: f32 = 0.5;

// Model placement
pub const MOBILE_BREAKPOINT: f32 = 768.0;
pub const MOBILE_SCALE: f32 = 1.4;
pub const DESKTOP_SCALE: f32 = 2.0;
pub const MOBILE_Z: f32 = 0.7;
pub const DESKTOP_Z: f32 = 1.0;

// Pointer-follow rotation
pub const ROTATION_X_FACTOR: f32 = 0.3;
pub const ROTATION_Y_FACTOR: f32 = 0.5;
pub const ROTATION_LERP_FACTOR: f32 = 0.05;

// Lighting
pub const AMBIENT_LIGHT_INTENSITY: f32 = 1.2;
pub const MAIN_LIGHT_INTENSITY: f32 = 1.6;
pub const DYNAMIC_LIGHT_INTENSITY: f32 = 100.0;
pub const DISCO_LIGHT_INTENSITY: f32 = 100.0;
pub const DISCO_LIGHT_HUE_SPEED: f32 = 0.0003; // hue turns per millisecond
pub const DISCO_LIGHT_MOVE_SPEED: f32 = 0.001;
pub const DISCO_LETTER_HUE_SPEED: f32 = 0.0002;
pub const LIGHT_LERP_FACTOR: f32 = 0.1;
pub const LIGHT_INTENSITY_THRESHOLD: f32 = 0.01; // below this the dynamic light is considered off
pub const DISCO_LIGHT_RADIUS: f32 = 5.0;
pub const MOUSE_LIGHT_MULTIPLIER: f32 = 5.0;
pub const LIGHT_Z_POSITION: f32 = 4.0;
pub const LIGHT_Z_ANIMATION: f32 = 1.5;

// Disco letter animation
pub const LETTER_THROTTLE_MS: f64 = 33.0; // ~30 FPS for DOM color updates
pub const COLOR_CACHE_STEP: u32 = 15; // degrees between cached hues
pub const COLOR_SATURATION: f32 = 1.0;
pub const COLOR_LIGHTNESS: f32 = 0.6;

// Camera
pub const CAMERA_Z: f32 = 3.0;
pub const CAMERA_FOV_DEG: f32 = 75.0;
pub const CAMERA_ZNEAR: f32 = 0.1;
pub const CAMERA_ZFAR: f32 = 1000.0;
