pub const DEFAULT_DTR_URL: &str = "https://typeapi.lab.pidconsortium.net";
pub const DEFAULT_MSCR_URL: &str = "https://mscr-test.rahtiapp.fi";

pub const DTR_TYPES_PATH: &str = "/v1/types/";
pub const DTR_SCHEMA_PATH: &str = "/v1/types/schema/";

pub const MSCR_SCHEMA_FULL_PATH: &str = "/datamodel-api/v2/schemaFull";
pub const MSCR_DTR_TYPES_PATH: &str = "/datamodel-api/v2/dtr/schema/";

/// Registration uploads are slow; MSCR parses the whole document before answering.
pub const MSCR_TIMEOUT_SECS: u64 = 200;

/// Nesting limit when resolving subtypes of a DTR schema.
pub const MAX_RESOLVE_DEPTH: usize = 32;

pub const CONFIG_ENV: &str = "TACOS_CONFIG";
pub const CONFIG_FILE: &str = "tacos/config.yaml";
