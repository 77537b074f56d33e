/// Main output tag used when a transform does not name one
pub const DEFAULT_MAIN_OUTPUT: &str = "main";
/// Side output tag built-in functions fall back to when none is configured
pub const DEFAULT_SIDE_OUTPUT: &str = "errors";
/// Number of input lines per bundle when not configured
pub const DEFAULT_BUNDLE_SIZE: usize = 4;
/// Collection id the input lines are committed under
pub const INPUT_PCOLLECTION: &str = "input";
