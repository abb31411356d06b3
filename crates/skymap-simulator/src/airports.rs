//! Airport tables: the built-in European set and CSV loading.

use crate::error::Result;
use serde::Deserialize;
use skymap_domain::{Airport, DomainError, GeoPosition};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// (code, name, longitude, latitude, altitude in meters)
const EUROPEAN_AIRPORTS: [(&str, &str, f64, f64, f64); 48] = [
    ("LHR", "London Heathrow Airport", -0.4543, 51.4700, 25.0),
    ("CDG", "Charles de Gaulle Airport", 2.55, 49.0097, 119.0),
    ("FRA", "Frankfurt Airport", 8.5705, 50.0333, 111.0),
    ("AMS", "Amsterdam Schiphol Airport", 4.7639, 52.3086, 3.0),
    ("MAD", "Adolfo Suárez Madrid–Barajas Airport", -3.5676, 40.4936, 610.0),
    ("BCN", "Barcelona–El Prat Airport", 2.0785, 41.2974, 4.0),
    ("FCO", "Leonardo da Vinci–Fiumicino Airport", 12.2508, 41.8003, 5.0),
    ("MUC", "Munich Airport", 11.7861, 48.3538, 453.0),
    ("ZRH", "Zurich Airport", 8.5492, 47.4647, 432.0),
    ("VIE", "Vienna International Airport", 16.5697, 48.1103, 183.0),
    ("BRU", "Brussels Airport", 4.4844, 50.9014, 58.0),
    ("CPH", "Copenhagen Airport", 12.6508, 55.6181, 5.0),
    ("OSL", "Oslo Gardermoen Airport", 11.1004, 60.1939, 208.0),
    ("ARN", "Stockholm Arlanda Airport", 17.9186, 59.6519, 42.0),
    ("HEL", "Helsinki Airport", 24.9633, 60.3172, 55.0),
    ("DUB", "Dublin Airport", -6.2701, 53.4213, 74.0),
    ("LIS", "Lisbon Airport", -9.1355, 38.7742, 114.0),
    ("ATH", "Athens International Airport", 23.9445, 37.9364, 94.0),
    ("IST", "Istanbul Airport", 28.8146, 40.9769, 99.0),
    ("SVO", "Sheremetyevo International Airport", 37.4146, 55.9726, 192.0),
    ("LED", "Pulkovo Airport", 30.2625, 59.8003, 24.0),
    ("WAW", "Warsaw Chopin Airport", 20.9671, 52.1657, 110.0),
    ("PRG", "Václav Havel Airport Prague", 14.2632, 50.1008, 380.0),
    ("BUD", "Budapest Ferenc Liszt International Airport", 19.2611, 47.4369, 151.0),
    ("OTP", "Henri Coandă International Airport", 26.085, 44.5711, 95.0),
    ("SOF", "Sofia Airport", 23.4114, 42.6952, 531.0),
    ("BEG", "Belgrade Nikola Tesla Airport", 20.3091, 44.8184, 102.0),
    ("ZAG", "Zagreb Airport", 16.0688, 45.7429, 108.0),
    ("LJU", "Ljubljana Jože Pučnik Airport", 14.4576, 46.2237, 388.0),
    ("TIA", "Tirana International Airport Nënë Tereza", 19.7206, 41.4147, 38.0),
    ("SKG", "Thessaloniki Airport", 22.9709, 40.5197, 7.0),
    ("RIX", "Riga International Airport", 23.9711, 56.9236, 10.0),
    ("VNO", "Vilnius Airport", 25.2858, 54.6341, 197.0),
    ("TLL", "Tallinn Airport", 24.8328, 59.4133, 40.0),
    ("MSQ", "Minsk National Airport", 28.0307, 53.8825, 204.0),
    ("EVN", "Zvartnots International Airport", 44.4009, 40.1473, 865.0),
    ("GYD", "Heydar Aliyev International Airport", 50.0506, 40.4675, 3.0),
    ("TBS", "Tbilisi International Airport", 44.9547, 41.6692, 495.0),
    ("KBP", "Boryspil International Airport", 30.8947, 50.345, 130.0),
    ("ODS", "Odesa International Airport", 30.6765, 46.4268, 40.0),
    ("LWO", "Lviv Danylo Halytskyi International Airport", 23.9561, 49.8125, 325.0),
    ("KIV", "Chișinău International Airport", 28.9308, 46.9277, 122.0),
    ("MLA", "Malta International Airport", 14.4775, 35.8575, 91.0),
    ("LCA", "Larnaca International Airport", 33.6249, 34.8751, 8.0),
    ("PFO", "Paphos International Airport", 32.4857, 34.718, 12.0),
    ("HER", "Heraklion International Airport", 25.1803, 35.3397, 39.0),
    ("RHO", "Rhodes International Airport", 28.1633, 36.4054, 6.0),
    ("CFU", "Corfu International Airport", 19.9117, 39.6019, 2.0),
];

/// The 48-airport European table used by the default scenario.
pub fn builtin() -> Vec<Airport> {
    EUROPEAN_AIRPORTS
        .iter()
        .map(|&(code, name, lon, lat, alt)| Airport::new(code, name, GeoPosition::new(lon, lat, alt)))
        .collect()
}

/// One row of an airport CSV file.
#[derive(Debug, Deserialize)]
struct AirportRecord {
    code: String,
    name: String,
    longitude: f64,
    latitude: f64,
    altitude: f64,
}

/// Load an airport table from a CSV file with header
/// `code,name,longitude,latitude,altitude`.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<Airport>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let airports = read_airports(file)?;
    info!(path = %path.display(), count = airports.len(), "Loaded airport table");
    Ok(airports)
}

/// Parse airport rows from any reader.
///
/// Rows whose fields do not parse and rows with out-of-range coordinates
/// are skipped with a warning. A repeated code fails the whole table since flights look
/// airports up by code.
pub fn read_airports<R: Read>(reader: R) -> Result<Vec<Airport>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut seen = HashSet::new();
    let mut airports = Vec::new();
    for result in rdr.deserialize::<AirportRecord>() {
        let record = match result {
            Ok(record) => record,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Deserialize { .. }) => {
                warn!("Skipping airport row: {}", e);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let position = match GeoPosition::validated(record.longitude, record.latitude, record.altitude) {
            Ok(position) => position,
            Err(e) => {
                warn!(code = %record.code, "Skipping airport row: {}", e);
                continue;
            }
        };

        if !seen.insert(record.code.clone()) {
            return Err(DomainError::DuplicateAirportCode(record.code).into());
        }
        airports.push(Airport::new(record.code, record.name, position));
    }

    Ok(airports)
}
