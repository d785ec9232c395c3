//! Problem definition and data structures for the vessel pickup-and-delivery problem.

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Monetary cost unit used throughout the crate.
pub type Cost = i64;
/// Time unit used throughout the crate.
pub type Time = i64;

/// A closed time interval `[lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub lower: Time,
    pub upper: Time,
}

impl TimeWindow {
    pub fn new(lower: Time, upper: Time) -> Self {
        TimeWindow { lower, upper }
    }
}

/// A vessel of the fleet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vessel {
    /// Zero-based port index the vessel starts from
    pub home_port: usize,
    pub start_time: Time,
    pub capacity: i64,
    /// One-based ids of the cargoes this vessel may carry
    pub compatible: Vec<usize>,
}

impl Vessel {
    pub fn new(home_port: usize, start_time: Time, capacity: i64, compatible: Vec<usize>) -> Self {
        Vessel {
            home_port,
            start_time,
            capacity,
            compatible,
        }
    }
}

/// A cargo that has to be picked up at its origin and delivered at its destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cargo {
    /// Zero-based origin port index
    pub origin: usize,
    /// Zero-based destination port index
    pub destination: usize,
    pub size: i64,
    /// Cost paid when the cargo is left to the spot market
    pub penalty: Cost,
    pub pickup_window: TimeWindow,
    pub delivery_window: TimeWindow,
}

impl Cargo {
    pub fn new(
        origin: usize,
        destination: usize,
        size: i64,
        penalty: Cost,
        pickup_window: TimeWindow,
        delivery_window: TimeWindow,
    ) -> Self {
        Cargo {
            origin,
            destination,
            size,
            penalty,
            pickup_window,
            delivery_window,
        }
    }
}

/// Sailing time and cost of one leg for one vessel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arc {
    pub time: Time,
    pub cost: Cost,
}

/// Port service terms of a compatible vessel/cargo pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CargoTerms {
    pub pickup_time: Time,
    pub pickup_cost: Cost,
    pub delivery_time: Time,
    pub delivery_cost: Cost,
}

/// Represents a complete problem instance.
///
/// The arc and terms tables are dense and validated on construction, so
/// lookups never fail afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub name: String,
    pub port_count: usize,
    pub vessels: Vec<Vessel>,
    pub cargoes: Vec<Cargo>,
    /// Indexed by `(vessel * ports + origin) * ports + destination`
    arcs: Vec<Arc>,
    /// Indexed by `vessel * cargoes + cargo index`; `None` means incompatible
    terms: Vec<Option<CargoTerms>>,
}

impl Problem {
    /// Create a problem instance, checking that every table is complete and consistent.
    pub fn new(
        name: String,
        port_count: usize,
        vessels: Vec<Vessel>,
        cargoes: Vec<Cargo>,
        arcs: Vec<Arc>,
        terms: Vec<Option<CargoTerms>>,
    ) -> Result<Self> {
        if port_count == 0 {
            bail!("problem {name} has no ports");
        }

        let expected_arcs = vessels.len() * port_count * port_count;
        if arcs.len() != expected_arcs {
            bail!(
                "arc table has {} entries, expected {} (vessels x ports x ports)",
                arcs.len(),
                expected_arcs
            );
        }

        let expected_terms = vessels.len() * cargoes.len();
        if terms.len() != expected_terms {
            bail!(
                "vessel/cargo table has {} entries, expected {} (vessels x cargoes)",
                terms.len(),
                expected_terms
            );
        }

        for (v, vessel) in vessels.iter().enumerate() {
            if vessel.home_port >= port_count {
                bail!("vessel {} has home port {} outside 1..={}", v + 1, vessel.home_port + 1, port_count);
            }
            for &cargo in &vessel.compatible {
                if cargo == 0 || cargo > cargoes.len() {
                    bail!("vessel {} lists unknown cargo {}", v + 1, cargo);
                }
                if terms[v * cargoes.len() + cargo - 1].is_none() {
                    bail!(
                        "vessel {} lists cargo {} as compatible but has no port terms for it",
                        v + 1,
                        cargo
                    );
                }
            }
            for c in 0..cargoes.len() {
                if terms[v * cargoes.len() + c].is_some() && !vessel.compatible.contains(&(c + 1)) {
                    bail!(
                        "vessel {} has port terms for cargo {} but does not list it as compatible",
                        v + 1,
                        c + 1
                    );
                }
            }
        }

        for (c, cargo) in cargoes.iter().enumerate() {
            if cargo.origin >= port_count || cargo.destination >= port_count {
                bail!("cargo {} references a port outside 1..={}", c + 1, port_count);
            }
        }

        Ok(Problem {
            name,
            port_count,
            vessels,
            cargoes,
            arcs,
            terms,
        })
    }

    /// Get the number of vessels.
    pub fn vessel_count(&self) -> usize {
        self.vessels.len()
    }

    /// Get the number of cargoes.
    pub fn cargo_count(&self) -> usize {
        self.cargoes.len()
    }

    /// Length of every encoded solution of this instance.
    pub fn solution_len(&self) -> usize {
        2 * self.cargoes.len() + self.vessels.len()
    }

    /// Get a cargo by its one-based id.
    pub fn cargo(&self, id: usize) -> &Cargo {
        &self.cargoes[id - 1]
    }

    /// Sailing time and cost for `vessel` between two zero-based ports.
    pub fn arc(&self, vessel: usize, from: usize, to: usize) -> Arc {
        self.arcs[(vessel * self.port_count + from) * self.port_count + to]
    }

    /// Port terms of `vessel` for the cargo with one-based `cargo` id.
    pub fn terms(&self, vessel: usize, cargo: usize) -> Option<&CargoTerms> {
        self.terms[vessel * self.cargoes.len() + cargo - 1].as_ref()
    }

    /// Check whether `vessel` may carry the cargo with one-based `cargo` id.
    pub fn is_compatible(&self, vessel: usize, cargo: usize) -> bool {
        self.terms(vessel, cargo).is_some()
    }

    /// Load a problem from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read instance {}", path.display()))?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "instance".to_string());

        Self::parse(&name, &text).with_context(|| format!("malformed instance {}", path.display()))
    }

    /// Parse a problem from the instance text format.
    ///
    /// Lines starting with `%` and blank lines are skipped. Every data line
    /// must be consumed exactly once.
    pub fn parse(name: &str, text: &str) -> Result<Self> {
        let mut lines = Lines::new(text);

        let port_count = lines.single("number of ports")?;
        let port_count = to_count(port_count, "number of ports")?;
        let vessel_count = to_count(lines.single("number of vessels")?, "number of vessels")?;

        let mut vessels = Vec::with_capacity(vessel_count);
        for v in 0..vessel_count {
            let fields = lines.fields(4, "vessel")?;
            expect_id(fields[0], v, "vessel")?;
            let home_port = to_index(fields[1], port_count, "home port")?;
            vessels.push(Vessel::new(home_port, fields[2], fields[3], Vec::new()));
        }

        let cargo_count = to_count(lines.single("number of cargoes")?, "number of cargoes")?;

        for v in 0..vessel_count {
            let fields = lines.fields(1, "vessel compatibility")?;
            expect_id(fields[0], v, "vessel compatibility")?;
            vessels[v].compatible = fields[1..]
                .iter()
                .map(|&id| to_index(id, cargo_count, "compatible cargo").map(|c| c + 1))
                .collect::<Result<Vec<_>>>()?;
        }

        let mut cargoes = Vec::with_capacity(cargo_count);
        for c in 0..cargo_count {
            let fields = lines.fields(9, "cargo")?;
            expect_id(fields[0], c, "cargo")?;
            cargoes.push(Cargo::new(
                to_index(fields[1], port_count, "origin port")?,
                to_index(fields[2], port_count, "destination port")?,
                fields[3],
                fields[4],
                TimeWindow::new(fields[5], fields[6]),
                TimeWindow::new(fields[7], fields[8]),
            ));
        }

        let mut arcs: Vec<Option<Arc>> = vec![None; vessel_count * port_count * port_count];
        for _ in 0..arcs.len() {
            let fields = lines.fields(5, "arc")?;
            let v = to_index(fields[0], vessel_count, "arc vessel")?;
            let from = to_index(fields[1], port_count, "arc origin")?;
            let to = to_index(fields[2], port_count, "arc destination")?;
            let slot = &mut arcs[(v * port_count + from) * port_count + to];
            if slot.is_some() {
                bail!("duplicate arc for vessel {} from {} to {}", v + 1, from + 1, to + 1);
            }
            *slot = Some(Arc {
                time: fields[3],
                cost: fields[4],
            });
        }

        let mut terms: Vec<Option<Option<CargoTerms>>> = vec![None; vessel_count * cargo_count];
        for _ in 0..terms.len() {
            let fields = lines.fields(3, "vessel/cargo terms")?;
            let v = to_index(fields[0], vessel_count, "terms vessel")?;
            let c = to_index(fields[1], cargo_count, "terms cargo")?;
            let entry = if fields[2] == -1 {
                None
            } else {
                if fields.len() < 6 {
                    bail!(
                        "line {}: vessel/cargo terms need 6 fields, found {}",
                        lines.line_number,
                        fields.len()
                    );
                }
                Some(CargoTerms {
                    pickup_time: fields[2],
                    pickup_cost: fields[3],
                    delivery_time: fields[4],
                    delivery_cost: fields[5],
                })
            };
            let slot = &mut terms[v * cargo_count + c];
            if slot.is_some() {
                bail!("duplicate terms for vessel {} and cargo {}", v + 1, c + 1);
            }
            *slot = Some(entry);
        }

        if let Some(extra) = lines.next_data() {
            bail!("line {}: unexpected trailing data {:?}", lines.line_number, extra);
        }

        // As many keyed lines as slots were read and duplicates rejected, so every slot is set.
        let arcs = arcs
            .into_iter()
            .map(|arc| arc.ok_or_else(|| anyhow!("arc table incomplete")))
            .collect::<Result<Vec<_>>>()?;
        let terms = terms
            .into_iter()
            .map(|entry| entry.ok_or_else(|| anyhow!("vessel/cargo table incomplete")))
            .collect::<Result<Vec<_>>>()?;

        Problem::new(name.to_string(), port_count, vessels, cargoes, arcs, terms)
    }
}

/// Cursor over the data lines of an instance file.
struct Lines<'a> {
    inner: std::str::Lines<'a>,
    line_number: usize,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        Lines {
            inner: text.lines(),
            line_number: 0,
        }
    }

    fn next_data(&mut self) -> Option<&'a str> {
        for line in self.inner.by_ref() {
            self.line_number += 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('%') {
                continue;
            }
            return Some(line);
        }
        None
    }

    fn fields(&mut self, min: usize, what: &str) -> Result<Vec<i64>> {
        let line = self
            .next_data()
            .ok_or_else(|| anyhow!("unexpected end of input, expected {what} line"))?;
        let fields = line
            .split(|ch: char| ch == ',' || ch.is_whitespace())
            .filter(|field| !field.is_empty())
            .map(|field| {
                field
                    .parse::<i64>()
                    .with_context(|| format!("line {}: invalid integer {:?}", self.line_number, field))
            })
            .collect::<Result<Vec<_>>>()?;
        if fields.len() < min {
            bail!(
                "line {}: {what} line needs at least {min} fields, found {}",
                self.line_number,
                fields.len()
            );
        }
        Ok(fields)
    }

    fn single(&mut self, what: &str) -> Result<i64> {
        let fields = self.fields(1, what)?;
        if fields.len() != 1 {
            bail!("line {}: expected a single value for {what}", self.line_number);
        }
        Ok(fields[0])
    }
}

fn to_count(value: i64, what: &str) -> Result<usize> {
    usize::try_from(value).map_err(|_| anyhow!("{what} must not be negative, got {value}"))
}

/// Convert a one-based id into a zero-based index below `bound`.
fn to_index(value: i64, bound: usize, what: &str) -> Result<usize> {
    if value < 1 || value as usize > bound {
        bail!("{what} {value} outside 1..={bound}");
    }
    Ok(value as usize - 1)
}

fn expect_id(value: i64, index: usize, what: &str) -> Result<()> {
    if value != index as i64 + 1 {
        bail!("{what} lines out of order: expected id {}, found {}", index + 1, value);
    }
    Ok(())
}
