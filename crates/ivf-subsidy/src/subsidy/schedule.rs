use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::domain::{AgeBand, CycleTier, IncomeTier, TreatmentStage};
use super::scheme::SchemeVersion;

/// Lookup coordinates of a single subsidy amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScheduleKey {
    pub scheme: SchemeVersion,
    pub income_tier: IncomeTier,
    pub stage: TreatmentStage,
    pub age_band: AgeBand,
    pub cycle_tier: CycleTier,
}

impl ScheduleKey {
    fn with_scheme(self, scheme: SchemeVersion) -> Self {
        Self { scheme, ..self }
    }

    /// Key whose amount this one must repeat given the shape of the tables.
    ///
    /// Legacy amounts only distinguish the first cycle from the rest and never
    /// vary by age band; low-income amounts are flat per stage.
    fn canonical(self) -> Self {
        match (self.income_tier, self.scheme) {
            (IncomeTier::LowIncome, _) => Self {
                age_band: AgeBand::Standard,
                cycle_tier: CycleTier::First,
                ..self
            },
            (IncomeTier::General, SchemeVersion::Legacy) => Self {
                age_band: AgeBand::Standard,
                cycle_tier: if self.cycle_tier.is_first() {
                    CycleTier::First
                } else {
                    CycleTier::SecondToThird
                },
                ..self
            },
            (IncomeTier::General, SchemeVersion::Current) => self,
        }
    }

    /// Every key a complete schedule must carry.
    pub fn all() -> impl Iterator<Item = ScheduleKey> {
        SchemeVersion::ALL.into_iter().flat_map(|scheme| {
            IncomeTier::ALL.into_iter().flat_map(move |income_tier| {
                TreatmentStage::ALL.into_iter().flat_map(move |stage| {
                    AgeBand::ALL.into_iter().flat_map(move |age_band| {
                        CycleTier::ALL.into_iter().map(move |cycle_tier| ScheduleKey {
                            scheme,
                            income_tier,
                            stage,
                            age_band,
                            cycle_tier,
                        })
                    })
                })
            })
        })
    }
}

impl fmt::Display for ScheduleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{:?}/{}/{:?}/{:?}",
            self.scheme, self.income_tier, self.stage, self.age_band, self.cycle_tier
        )
    }
}

/// Serialized form of one schedule cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    #[serde(flatten)]
    pub key: ScheduleKey,
    pub amount: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("schedule is missing an amount for {0}")]
    Missing(ScheduleKey),
    #[error("schedule lists {0} more than once")]
    Duplicate(ScheduleKey),
    #[error("scheme 3.0 amount {current} for {key} is below the scheme 2.0 amount {legacy}")]
    NotMonotonic {
        key: ScheduleKey,
        current: u32,
        legacy: u32,
    },
    #[error("amount {found} for {key} must match {expected} (tier does not vary by this key)")]
    Shape {
        key: ScheduleKey,
        expected: u32,
        found: u32,
    },
    #[error("unable to read schedule: {0}")]
    Io(#[from] std::io::Error),
    #[error("unable to parse schedule: {0}")]
    Parse(#[from] serde_json::Error),
}

// Scheme 2.0, general households: (stage, first cycle, later cycles).
const LEGACY_GENERAL: [(TreatmentStage, u32, u32); 3] = [
    (TreatmentStage::FullCycle, 100_000, 60_000),
    (TreatmentStage::RetrievalOnly, 70_000, 40_000),
    (TreatmentStage::TransferOnly, 30_000, 20_000),
];

// Low-income households: (stage, scheme 2.0, scheme 3.0).
const LOW_INCOME: [(TreatmentStage, u32, u32); 3] = [
    (TreatmentStage::FullCycle, 150_000, 150_000),
    (TreatmentStage::RetrievalOnly, 90_000, 90_000),
    (TreatmentStage::TransferOnly, 60_000, 60_000),
];

// Scheme 3.0, general households: [1st, 2nd-3rd, 4th+].
const CURRENT_GENERAL: [(AgeBand, TreatmentStage, [u32; 3]); 6] = [
    (AgeBand::Standard, TreatmentStage::FullCycle, [150_000, 100_000, 60_000]),
    (AgeBand::Standard, TreatmentStage::RetrievalOnly, [90_000, 60_000, 40_000]),
    (AgeBand::Standard, TreatmentStage::TransferOnly, [40_000, 30_000, 20_000]),
    (AgeBand::Senior, TreatmentStage::FullCycle, [150_000, 100_000, 60_000]),
    // 2nd-3rd and 4th+ share one figure; 4th+ is unreachable under the senior cap.
    (AgeBand::Senior, TreatmentStage::RetrievalOnly, [90_000, 40_000, 40_000]),
    (AgeBand::Senior, TreatmentStage::TransferOnly, [40_000, 30_000, 20_000]),
];

/// Fully expanded amount table for both schemes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsidySchedule {
    amounts: BTreeMap<ScheduleKey, u32>,
}

impl Default for SubsidySchedule {
    fn default() -> Self {
        Self::standard()
    }
}

impl SubsidySchedule {
    /// Published amounts for schemes 2.0 and 3.0.
    pub fn standard() -> Self {
        let amounts = ScheduleKey::all()
            .map(|key| (key, standard_amount(key)))
            .collect();
        Self { amounts }
    }

    pub fn from_entries<I>(entries: I) -> Result<Self, ScheduleError>
    where
        I: IntoIterator<Item = ScheduleEntry>,
    {
        let mut amounts = BTreeMap::new();
        for entry in entries {
            if amounts.insert(entry.key, entry.amount).is_some() {
                return Err(ScheduleError::Duplicate(entry.key));
            }
        }

        let schedule = Self { amounts };
        schedule.validate()?;
        Ok(schedule)
    }

    /// Reads a JSON array of [`ScheduleEntry`] values.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ScheduleError> {
        let entries: Vec<ScheduleEntry> = serde_json::from_reader(reader)?;
        Self::from_entries(entries)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScheduleError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Checks completeness, table shape, and that 3.0 never pays less than 2.0.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        for key in ScheduleKey::all() {
            let found = self.lookup(key).ok_or(ScheduleError::Missing(key))?;

            let canonical = key.canonical();
            if canonical != key {
                let expected = self
                    .lookup(canonical)
                    .ok_or(ScheduleError::Missing(canonical))?;
                if expected != found {
                    return Err(ScheduleError::Shape {
                        key,
                        expected,
                        found,
                    });
                }
            }

            if key.scheme == SchemeVersion::Current {
                let legacy_key = key.with_scheme(SchemeVersion::Legacy);
                let legacy = self
                    .lookup(legacy_key)
                    .ok_or(ScheduleError::Missing(legacy_key))?;
                if found < legacy {
                    return Err(ScheduleError::NotMonotonic {
                        key,
                        current: found,
                        legacy,
                    });
                }
            }
        }

        Ok(())
    }

    fn lookup(&self, key: ScheduleKey) -> Option<u32> {
        self.amounts.get(&key).copied()
    }

    /// Amount for a key. Schedules are complete by construction.
    pub fn amount(&self, key: ScheduleKey) -> u32 {
        self.lookup(key).unwrap_or(0)
    }

    pub fn entries(&self) -> Vec<ScheduleEntry> {
        self.amounts
            .iter()
            .map(|(key, amount)| ScheduleEntry {
                key: *key,
                amount: *amount,
            })
            .collect()
    }
}

fn standard_amount(key: ScheduleKey) -> u32 {
    match (key.income_tier, key.scheme) {
        (IncomeTier::LowIncome, scheme) => LOW_INCOME
            .iter()
            .find(|(stage, _, _)| *stage == key.stage)
            .map(|(_, legacy, current)| match scheme {
                SchemeVersion::Legacy => *legacy,
                SchemeVersion::Current => *current,
            })
            .unwrap_or(0),
        (IncomeTier::General, SchemeVersion::Legacy) => LEGACY_GENERAL
            .iter()
            .find(|(stage, _, _)| *stage == key.stage)
            .map(|(_, first, later)| {
                if key.cycle_tier.is_first() {
                    *first
                } else {
                    *later
                }
            })
            .unwrap_or(0),
        (IncomeTier::General, SchemeVersion::Current) => CURRENT_GENERAL
            .iter()
            .find(|(band, stage, _)| *band == key.age_band && *stage == key.stage)
            .map(|(_, _, tiers)| match key.cycle_tier {
                CycleTier::First => tiers[0],
                CycleTier::SecondToThird => tiers[1],
                CycleTier::FourthOnward => tiers[2],
            })
            .unwrap_or(0),
    }
}
