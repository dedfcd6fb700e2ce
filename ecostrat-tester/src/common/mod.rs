pub mod scenario;
pub mod util;

pub use util::{load_config_file, parse_seeds, split_csv};
