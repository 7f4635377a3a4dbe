use std::collections::BTreeMap;
use std::io;

use serde::Serialize;

use crate::action::Direction;
use crate::error::GridError;
use crate::state::Coord;

/// Chosen direction for every non-wall state.
pub type Policy = BTreeMap<Coord, Direction>;

/// Current utility of every non-wall state.
pub type Utilities = BTreeMap<Coord, f64>;

/// Utility of one state after a given number of sweeps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TracePoint {
    pub sweep: usize,
    pub utility: f64,
}

/// Per-state utility history, for plotting convergence curves.
///
/// Every series starts at sweep 0 with utility 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UtilityTrace {
    series: BTreeMap<Coord, Vec<TracePoint>>,
}

#[derive(Serialize)]
struct TraceRecord<'a> {
    algorithm: &'a str,
    row: usize,
    col: usize,
    sweep: usize,
    utility: f64,
}

impl UtilityTrace {
    pub fn new<I: IntoIterator<Item = Coord>>(coords: I) -> UtilityTrace {
        let series = coords
            .into_iter()
            .map(|c| (c, vec![TracePoint { sweep: 0, utility: 0.0 }]))
            .collect();
        UtilityTrace { series }
    }

    /// Append a point. The coordinate must have been registered in `new`.
    pub fn record(&mut self, coord: Coord, sweep: usize, utility: f64) {
        self.series
            .get_mut(&coord)
            .unwrap_or_else(|| panic!("No utility trace for state {}", coord))
            .push(TracePoint { sweep, utility });
    }

    pub fn series(&self, coord: Coord) -> Option<&[TracePoint]> {
        self.series.get(&coord).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Coord, &Vec<TracePoint>)> {
        self.series.iter()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Write one CSV row per trace point, tagged with `algorithm`.
    pub fn write_csv<W: io::Write>(
        &self, algorithm: &str, wtr: &mut csv::Writer<W>
    ) -> Result<(), GridError> {
        for (coord, points) in &self.series {
            for point in points {
                wtr.serialize(TraceRecord {
                    algorithm,
                    row: coord.row,
                    col: coord.col,
                    sweep: point.sweep,
                    utility: point.utility,
                })?;
            }
        }
        Ok(())
    }
}
