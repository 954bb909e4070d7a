//! Built-in station tables.
//!
//! Station names follow the upstream's `mrt` field. Platform letters are
//! assigned per direction and have not been checked against live responses.

use super::error::NetworkError;
use super::line::{Line, LineId, LineTable};
use super::station::Station;

/// (line-scoped code, three-letter code, ascending platform, descending platform, name)
type Row = (&'static str, &'static str, &'static str, &'static str, &'static str);

const NORTH_SOUTH: &[Row] = &[
    ("NS1", "JUR", "E", "F", "Jurong East"),
    ("NS2", "BBT", "B", "A", "Bukit Batok"),
    ("NS3", "BGB", "B", "A", "Bukit Gombak"),
    ("NS4", "CCK", "B", "A", "Choa Chu Kang"),
    ("NS5", "YWT", "B", "A", "Yew Tee"),
    ("NS7", "KRJ", "B", "A", "Kranji"),
    ("NS8", "MSL", "B", "A", "Marsiling"),
    ("NS9", "WDL", "B", "A", "Woodlands"),
    ("NS10", "ADM", "B", "A", "Admiralty"),
    ("NS11", "SBW", "B", "A", "Sembawang"),
    ("NS12", "CBR", "B", "A", "Canberra"),
    ("NS13", "YIS", "B", "A", "Yishun"),
    ("NS14", "KTB", "B", "A", "Khatib"),
    ("NS15", "YCK", "B", "A", "Yio Chu Kang"),
    ("NS16", "AMK", "B", "A", "Ang Mo Kio"),
    ("NS17", "BSH", "B", "A", "Bishan"),
    ("NS18", "BDL", "B", "A", "Braddell"),
    ("NS19", "TAP", "B", "A", "Toa Payoh"),
    ("NS20", "NOV", "B", "A", "Novena"),
    ("NS21", "NEW", "B", "A", "Newton"),
    ("NS22", "ORC", "B", "A", "Orchard"),
    ("NS23", "SOM", "B", "A", "Somerset"),
    ("NS24", "DBG", "B", "A", "Dhoby Ghaut"),
    ("NS25", "CTH", "C", "D", "City Hall"),
    ("NS26", "RFP", "C", "D", "Raffles Place"),
    ("NS27", "MRB", "B", "A", "Marina Bay"),
    ("NS28", "MSP", "B", "A", "Marina South Pier"),
];

const EAST_WEST: &[Row] = &[
    ("EW1", "PSR", "B", "A", "Pasir Ris"),
    ("EW2", "TAM", "B", "A", "Tampines"),
    ("EW3", "SIM", "B", "A", "Simei"),
    ("EW4", "TNM", "B", "A", "Tanah Merah"),
    ("EW5", "BDK", "B", "A", "Bedok"),
    ("EW6", "KEM", "B", "A", "Kembangan"),
    ("EW7", "EUN", "B", "A", "Eunos"),
    ("EW8", "PYL", "B", "A", "Paya Lebar"),
    ("EW9", "ALJ", "B", "A", "Aljunied"),
    ("EW10", "KAL", "B", "A", "Kallang"),
    ("EW11", "LVR", "B", "A", "Lavender"),
    ("EW12", "BGS", "B", "A", "Bugis"),
    ("EW13", "CTH", "B", "A", "City Hall"),
    ("EW14", "RFP", "B", "A", "Raffles Place"),
    ("EW15", "TPG", "B", "A", "Tanjong Pagar"),
    ("EW16", "OTP", "B", "A", "Outram Park"),
    ("EW17", "TIB", "B", "A", "Tiong Bahru"),
    ("EW18", "RDH", "B", "A", "Redhill"),
    ("EW19", "QUE", "B", "A", "Queenstown"),
    ("EW20", "COM", "B", "A", "Commonwealth"),
    ("EW21", "BNV", "B", "A", "Buona Vista"),
    ("EW22", "DOV", "B", "A", "Dover"),
    ("EW23", "CLE", "B", "A", "Clementi"),
    ("EW24", "JUR", "B", "A", "Jurong East"),
    ("EW25", "CNG", "B", "A", "Chinese Garden"),
    ("EW26", "LKS", "B", "A", "Lakeside"),
    ("EW27", "BNL", "B", "A", "Boon Lay"),
    ("EW28", "PNR", "B", "A", "Pioneer"),
    ("EW29", "JKN", "B", "A", "Joo Koon"),
    ("EW30", "GCL", "B", "A", "Gul Circle"),
    ("EW31", "TCR", "B", "A", "Tuas Crescent"),
    ("EW32", "TWR", "B", "A", "Tuas West Road"),
    ("EW33", "TLK", "B", "A", "Tuas Link"),
];

// The branch shuttles out of a single bay at Tanah Merah.
const CHANGI_AIRPORT: &[Row] = &[
    ("CG", "TNM", "C", "C", "Tanah Merah"),
    ("CG1", "XPO", "B", "A", "Expo"),
    ("CG2", "CGA", "B", "A", "Changi Airport"),
];

fn corridor(rows: &[Row], descending: bool) -> Result<Line, NetworkError> {
    let stations = rows
        .iter()
        .map(|&(code, code3, asc, desc, name)| {
            let platform = if descending { desc } else { asc };
            Station::new(code, code3, platform, name)
        })
        .collect();

    let ascending = Line::ordered_by_code(stations)?;
    if !descending {
        return Ok(ascending);
    }

    let mut stations = ascending.stations().to_vec();
    stations.reverse();
    Ok(Line::new(stations))
}

pub(super) fn singapore_lines() -> Result<LineTable<Line>, NetworkError> {
    LineTable::try_from_fn(|id| match id {
        LineId::Ns1 => corridor(NORTH_SOUTH, false),
        LineId::Ns2 => corridor(NORTH_SOUTH, true),
        LineId::Ew1 => corridor(EAST_WEST, false),
        LineId::Ew2 => corridor(EAST_WEST, true),
        LineId::Cg1 => corridor(CHANGI_AIRPORT, false),
        LineId::Cg2 => corridor(CHANGI_AIRPORT, true),
    })
}
