use crate::error::{MapError, Result};
use crate::models::RawRecord;
use crate::utils::constants::{
    COL_ACCOUNT, COL_LAT, COL_LON, COL_METER_BRAND, COL_METER_NUMBER, COL_MUNICIPALITY,
    COL_NAME, EXPECTED_COLUMNS,
};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::borrow::Cow;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

const UTF8_BOM: char = '\u{feff}';

/// Rows read from the input file with a stable schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub records: Vec<RawRecord>,
    /// Normalised header names in file order
    pub source_columns: Vec<String>,
    /// Expected columns absent from the file, filled with empty text
    pub missing_columns: Vec<String>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Positions of the expected columns within a source header.
#[derive(Debug, Default)]
struct ColumnIndex {
    name: Option<usize>,
    account: Option<usize>,
    municipality: Option<usize>,
    meter_number: Option<usize>,
    meter_brand: Option<usize>,
    lat: Option<usize>,
    lon: Option<usize>,
}

impl ColumnIndex {
    fn from_headers(columns: &[String]) -> Self {
        // First occurrence wins when a normalised name repeats
        let find = |wanted: &str| columns.iter().position(|c| c == wanted);
        Self {
            name: find(COL_NAME),
            account: find(COL_ACCOUNT),
            municipality: find(COL_MUNICIPALITY),
            meter_number: find(COL_METER_NUMBER),
            meter_brand: find(COL_METER_BRAND),
            lat: find(COL_LAT),
            lon: find(COL_LON),
        }
    }

    fn extract(&self, row: &StringRecord) -> RawRecord {
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };

        RawRecord {
            name: cell(self.name),
            account: cell(self.account),
            municipality: cell(self.municipality),
            meter_number: cell(self.meter_number),
            meter_brand: cell(self.meter_brand),
            lat: cell(self.lat),
            lon: cell(self.lon),
        }
    }
}

pub struct RecordReader {
    delimiter: u8,
}

impl RecordReader {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Read customer rows from a CSV file
    pub fn read_records(&self, path: &Path) -> Result<RawTable> {
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => MapError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => MapError::Io(e),
        })?;

        let content = decode_input(&bytes);
        let table = self.parse_records(&content, path)?;

        debug!(
            path = %path.display(),
            rows = table.len(),
            columns = table.source_columns.len(),
            "Loaded input file"
        );
        if !table.missing_columns.is_empty() {
            warn!(
                path = %path.display(),
                missing = ?table.missing_columns,
                "Input file lacks expected columns; defaulting them to empty"
            );
        }

        Ok(table)
    }

    /// Parse already decoded CSV text. `origin` is only used in error messages.
    pub fn parse_records(&self, content: &str, origin: &Path) -> Result<RawTable> {
        let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);

        // The csv reader accepts a quote left open until EOF as one long field
        if let Some(line) = unterminated_quote_line(content, self.delimiter) {
            return Err(parse_error(
                origin,
                format!("line {}: unterminated quoted field", line),
            ));
        }

        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(Trim::Headers)
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| parse_error(origin, e.to_string()))?
            .clone();

        if headers.is_empty() {
            return Err(parse_error(origin, "no header row".to_string()));
        }

        let source_columns: Vec<String> = headers.iter().map(normalize_column).collect();
        let missing_columns: Vec<String> = EXPECTED_COLUMNS
            .iter()
            .filter(|expected| !source_columns.iter().any(|c| c == *expected))
            .map(|c| c.to_string())
            .collect();

        let index = ColumnIndex::from_headers(&source_columns);
        let mut records = Vec::new();

        for row_result in reader.records() {
            let row = row_result.map_err(|e| parse_error(origin, e.to_string()))?;

            // Short rows are padded with empty cells; long rows cannot be aligned
            if row.len() > source_columns.len() {
                let line = row.position().map(|p| p.line()).unwrap_or_default();
                return Err(parse_error(
                    origin,
                    format!(
                        "line {}: expected {} fields, saw {}",
                        line,
                        source_columns.len(),
                        row.len()
                    ),
                ));
            }

            records.push(index.extract(&row));
        }

        Ok(RawTable {
            records,
            source_columns,
            missing_columns,
        })
    }
}

impl Default for RecordReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Trim and lowercase a header name
pub fn normalize_column(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Line on which a quoted field opens without ever being closed.
///
/// Follows the csv reader's rules: a quote only opens a field when it is the
/// field's first character, and `""` inside a quoted field is an escaped quote.
fn unterminated_quote_line(content: &str, delimiter: u8) -> Option<usize> {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        FieldStart,
        Unquoted,
        Quoted,
        QuoteInQuoted,
    }

    let mut state = State::FieldStart;
    let mut line = 1;
    let mut opened_on = 1;

    for &byte in content.as_bytes() {
        let is_terminator = byte == b'\n' || byte == b'\r';
        state = match state {
            State::FieldStart | State::Unquoted
                if byte == delimiter || is_terminator =>
            {
                State::FieldStart
            }
            State::FieldStart if byte == b'"' => {
                opened_on = line;
                State::Quoted
            }
            State::FieldStart | State::Unquoted => State::Unquoted,
            State::Quoted if byte == b'"' => State::QuoteInQuoted,
            State::Quoted => State::Quoted,
            State::QuoteInQuoted if byte == b'"' => State::Quoted,
            State::QuoteInQuoted if byte == delimiter || is_terminator => State::FieldStart,
            State::QuoteInQuoted => State::Unquoted,
        };
        if byte == b'\n' {
            line += 1;
        }
    }

    (state == State::Quoted).then_some(opened_on)
}

/// Decode file bytes as UTF-8, falling back to Windows-1252 for spreadsheet exports.
fn decode_input(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            warn!("Input is not valid UTF-8, decoding as Windows-1252; accented text may look wrong");
            let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            text
        }
    }
}

fn parse_error(path: &Path, message: String) -> MapError {
    MapError::Parse {
        path: path.to_path_buf(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &[u8]) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_read_records_file() -> Result<()> {
        let temp_file = write_csv(
            b"nombre_cliente,cuenta,municipio,numero_medidor,marca_medidor,lat,lon\n\
              Ana Ruiz,456,Duitama,M-001,Elster,5.8,-73.0\n\
              Juan Perez,123,Tunja,M-002,Itron,91,10\n",
        );

        let table = RecordReader::new().read_records(temp_file.path())?;

        assert_eq!(table.len(), 2);
        assert!(table.missing_columns.is_empty());
        assert_eq!(
            table.records[0],
            RawRecord {
                name: "Ana Ruiz".to_string(),
                account: "456".to_string(),
                municipality: "Duitama".to_string(),
                meter_number: "M-001".to_string(),
                meter_brand: "Elster".to_string(),
                lat: "5.8".to_string(),
                lon: "-73.0".to_string(),
            }
        );
        assert_eq!(table.records[1].lat, "91");

        Ok(())
    }

    #[test]
    fn test_headers_are_normalised() -> Result<()> {
        let temp_file = write_csv(
            b" Nombre_Cliente , CUENTA ,Municipio,LAT, Lon \n\"Perez, Juan\", 123 ,Sogamoso, 5.7 ,-72.9\n",
        );

        let table = RecordReader::new().read_records(temp_file.path())?;

        assert_eq!(
            table.source_columns,
            vec!["nombre_cliente", "cuenta", "municipio", "lat", "lon"]
        );
        assert_eq!(table.missing_columns, vec!["numero_medidor", "marca_medidor"]);

        let record = &table.records[0];
        assert_eq!(record.name, "Perez, Juan");
        assert_eq!(record.account, "123");
        assert_eq!(record.lat, "5.7");
        assert_eq!(record.meter_number, "");
        assert_eq!(record.meter_brand, "");

        Ok(())
    }

    #[test]
    fn test_missing_coordinate_columns_default_to_empty() -> Result<()> {
        let temp_file = write_csv(b"nombre_cliente,cuenta\nAna,1\n");

        let table = RecordReader::new().read_records(temp_file.path())?;

        assert_eq!(table.records[0].lat, "");
        assert_eq!(table.records[0].lon, "");
        assert!(table.missing_columns.contains(&"lat".to_string()));

        Ok(())
    }

    #[test]
    fn test_extra_and_duplicate_columns() -> Result<()> {
        let temp_file = write_csv(b"extra,cuenta,CUENTA,lat,lon\nx,first,second,1,2\n");

        let table = RecordReader::new().read_records(temp_file.path())?;

        assert_eq!(table.records[0].account, "first");
        Ok(())
    }

    #[test]
    fn test_short_rows_are_padded() -> Result<()> {
        let temp_file = write_csv(b"nombre_cliente,cuenta,lat,lon\nAna,1\n");

        let table = RecordReader::new().read_records(temp_file.path())?;

        assert_eq!(table.records[0].account, "1");
        assert_eq!(table.records[0].lat, "");
        Ok(())
    }

    #[test]
    fn test_long_rows_are_parse_errors() {
        let temp_file = write_csv(b"nombre_cliente,lat,lon\nAna,5.8,-73.0,unexpected\n");

        let result = RecordReader::new().read_records(temp_file.path());

        assert!(matches!(result, Err(MapError::Parse { .. })));
    }

    #[test]
    fn test_unterminated_quote_is_parse_error() {
        let result = RecordReader::new().parse_records(
            "nombre_cliente,lat,lon\n\"Ana,5.8,-73.0\nLuis,5.78,-73.11\n",
            Path::new("inline"),
        );

        match result {
            Err(MapError::Parse { message, .. }) => {
                assert_eq!(message, "line 2: unterminated quoted field");
            }
            other => panic!("expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_balanced_quotes_still_parse() -> Result<()> {
        let table = RecordReader::new().parse_records(
            "nombre_cliente,cuenta,lat,lon\n\"Perez, \"\"El Mono\"\"\",12\" tubo,5.8,-73.0\n\"Dos\nLineas\",1,5.7,-73.1\n",
            Path::new("inline"),
        )?;

        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].name, "Perez, \"El Mono\"");
        assert_eq!(table.records[0].account, "12\" tubo");
        assert_eq!(table.records[1].name, "Dos\nLineas");
        Ok(())
    }

    #[test]
    fn test_unterminated_quote_line() {
        assert_eq!(unterminated_quote_line("a,b\n\"x,y\n", b','), Some(2));
        assert_eq!(unterminated_quote_line("a,\"b\"\"\n", b','), Some(1));
        assert_eq!(unterminated_quote_line("a,\"b\"\"\"\n", b','), None);
        assert_eq!(unterminated_quote_line("a;b\n5\" x;\"y\"\n", b';'), None);
    }

    #[test]
    fn test_empty_file_is_parse_error() {
        let temp_file = write_csv(b"");

        let result = RecordReader::new().read_records(temp_file.path());

        assert!(matches!(result, Err(MapError::Parse { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = RecordReader::new().read_records(Path::new("does/not/exist.csv"));

        match result {
            Err(MapError::FileNotFound { path }) => {
                assert_eq!(path, Path::new("does/not/exist.csv"));
            }
            other => panic!("expected FileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_bom_and_windows_1252_input() -> Result<()> {
        let utf8 = write_csv("\u{feff}nombre_cliente,lat,lon\nAna,1,2\n".as_bytes());
        let table = RecordReader::new().read_records(utf8.path())?;
        assert_eq!(table.source_columns[0], "nombre_cliente");

        // "Muñoz" with 0xF1 for ñ
        let latin = write_csv(b"nombre_cliente,lat,lon\nMu\xf1oz,1,2\n");
        let table = RecordReader::new().read_records(latin.path())?;
        assert_eq!(table.records[0].name, "Muñoz");

        Ok(())
    }

    #[test]
    fn test_custom_delimiter() -> Result<()> {
        let table = RecordReader::with_delimiter(b';')
            .parse_records("nombre_cliente;lat;lon\nAna;5,8;-73\n", Path::new("inline"))?;

        assert_eq!(table.records[0].lat, "5,8");
        Ok(())
    }

    #[test]
    fn test_normalize_column() {
        assert_eq!(normalize_column("  NOMBRE_Cliente "), "nombre_cliente");
    }
}
