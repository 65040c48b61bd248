/// Input column names, after trimming and lowercasing
pub const COL_NAME: &str = "nombre_cliente";
pub const COL_ACCOUNT: &str = "cuenta";
pub const COL_MUNICIPALITY: &str = "municipio";
pub const COL_METER_NUMBER: &str = "numero_medidor";
pub const COL_METER_BRAND: &str = "marca_medidor";
pub const COL_LAT: &str = "lat";
pub const COL_LON: &str = "lon";

/// Every column the pipeline relies on, in schema order
pub const EXPECTED_COLUMNS: [&str; 7] = [
    COL_NAME,
    COL_ACCOUNT,
    COL_MUNICIPALITY,
    COL_METER_NUMBER,
    COL_METER_BRAND,
    COL_LAT,
    COL_LON,
];

/// File names
pub const DEFAULT_INPUT_FILE: &str = "AGPE_EBSA_unificada.csv";
pub const DEFAULT_CONFIG_FILE: &str = "agpe-map.toml";

/// Geographic bounds (inclusive)
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Map presentation defaults
pub const DEFAULT_ZOOM: u8 = 9;
pub const TOOLTIP_MAX_CHARS: usize = 40;
pub const DEFAULT_MAP_HEIGHT_PX: u32 = 650;
pub const DEFAULT_POPUP_MAX_WIDTH_PX: u32 = 350;
pub const DEFAULT_MAP_TITLE: &str = "AGPE EBSA - Mapa de clientes";
pub const GOOGLE_MAPS_BASE_URL: &str = "https://www.google.com/maps";

/// User-facing messages
pub const NO_RESULTS_MESSAGE: &str = "No hay resultados para esa búsqueda.";

/// Server defaults
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8501;
