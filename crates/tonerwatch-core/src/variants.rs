// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer variant tables.
//
// A variant is a printer model family sharing one SNMP identifier layout.
// Every layout below is constant data; `fields_for` expands a layout into
// the ordered field list the query and report stages work from. Supporting
// a new model means appending a layout here, never touching query logic.
//
// Supplies live in the Printer-MIB prtMarkerSuppliesTable (RFC 3805) and are
// addressed by their row index, which differs between models.

use crate::conversion::{Conversion, SUPPLY_LEVEL_STATES};
use crate::error::{MonitorError, Result};

// ---------------------------------------------------------------------------
// Well-known identifiers
// ---------------------------------------------------------------------------

/// SNMPv2-MIB sysName.
pub const SYS_NAME: &str = "1.3.6.1.2.1.1.5.0";
/// SNMPv2-MIB sysDescr.
pub const SYS_DESCR: &str = "1.3.6.1.2.1.1.1.0";
/// HOST-RESOURCES-MIB hrDeviceDescr of the first device.
pub const HR_DEVICE_DESCR: &str = "1.3.6.1.2.1.25.3.2.1.3.1";
/// Printer-MIB prtGeneralPrinterName.
pub const PRT_GENERAL_PRINTER_NAME: &str = "1.3.6.1.2.1.43.5.1.1.16.1";
/// Printer-MIB prtGeneralSerialNumber.
pub const PRT_GENERAL_SERIAL_NUMBER: &str = "1.3.6.1.2.1.43.5.1.1.17.1";
/// Printer-MIB prtMarkerLifeCount of the first marker.
pub const PRT_MARKER_LIFE_COUNT: &str = "1.3.6.1.2.1.43.10.2.1.4.1.1";

const SUPPLIES_TABLE: &str = "1.3.6.1.2.1.43.11.1.1";
const COL_DESCRIPTION: u32 = 6;
const COL_MAX_CAPACITY: u32 = 8;
const COL_LEVEL: u32 = 9;

// Xerox
const XRX_TOTAL: &str = "1.3.6.1.4.1.253.8.53.13.2.1.6.1.20.1";
const XRX_COLOR: &str = "1.3.6.1.4.1.253.8.53.13.2.1.6.1.20.33";
const XRX_MONO: &str = "1.3.6.1.4.1.253.8.53.13.2.1.6.1.20.34";
// HP
const HP_TOTAL: &str = "1.3.6.1.4.1.11.2.3.9.4.2.1.1.16.1.9.0";
const HP_COLOR: &str = "1.3.6.1.4.1.11.2.3.9.4.2.1.1.16.1.10.0";
const HP_MONO: &str = "1.3.6.1.4.1.11.2.3.9.4.2.1.1.16.1.11.0";
// Kyocera
const KYO_TOTAL: &str = "1.3.6.1.4.1.1347.42.2.1.1.1.6.1.1";
// Develop / Konica Minolta: prints and copies are counted separately
const DEV_PRINT_COLOR: &str = "1.3.6.1.4.1.18334.1.1.1.5.7.2.2.1.5.2.2";
const DEV_COPY_COLOR: &str = "1.3.6.1.4.1.18334.1.1.1.5.7.2.2.1.5.2.1";
const DEV_PRINT_MONO: &str = "1.3.6.1.4.1.18334.1.1.1.5.7.2.2.1.5.1.2";
const DEV_COPY_MONO: &str = "1.3.6.1.4.1.18334.1.1.1.5.7.2.2.1.5.1.1";
// OKI
const OKI_TOTAL: &str = "1.3.6.1.4.1.2001.1.1.1.1.11.1.10.150.1.6.102";
const OKI_COLOR: &str = "1.3.6.1.4.1.2001.1.1.1.1.11.1.10.170.1.6.1";
const OKI_MONO: &str = "1.3.6.1.4.1.2001.1.1.1.1.11.1.10.170.1.7.1";

// ---------------------------------------------------------------------------
// Field specification
// ---------------------------------------------------------------------------

/// One field of a variant: what to read and how to convert it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Symbolic name, unique within a variant.
    pub field: &'static str,
    /// Identifier holding the raw value.
    pub oid: String,
    /// Identifier holding a human-readable label (supplies only).
    pub label_oid: Option<String>,
    pub conversion: Conversion,
}

impl FieldSpec {
    fn identity(field: &'static str, oid: &str) -> Self {
        Self {
            field,
            oid: oid.to_string(),
            label_oid: None,
            conversion: Conversion::Identity,
        }
    }
}

/// Consumables, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Supply {
    Fuser,
    Cleaner,
    Transfer,
    Waste,
    BlackToner,
    CyanToner,
    MagentaToner,
    YellowToner,
    BlackDrum,
    CyanDrum,
    MagentaDrum,
    YellowDrum,
}

impl Supply {
    pub fn field(self) -> &'static str {
        match self {
            Self::Fuser => "fuser",
            Self::Cleaner => "cleaner",
            Self::Transfer => "transfer",
            Self::Waste => "waste",
            Self::BlackToner => "black_toner",
            Self::CyanToner => "cyan_toner",
            Self::MagentaToner => "magenta_toner",
            Self::YellowToner => "yellow_toner",
            Self::BlackDrum => "black_drum",
            Self::CyanDrum => "cyan_drum",
            Self::MagentaDrum => "magenta_drum",
            Self::YellowDrum => "yellow_drum",
        }
    }
}

// ---------------------------------------------------------------------------
// Layout data
// ---------------------------------------------------------------------------

/// How a supply reports its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tracking {
    /// Level against max capacity, reported as a percentage.
    Level,
    /// Only the level sentinel (ok / unknown / other) is meaningful.
    State,
}

#[derive(Debug, Clone, Copy)]
struct SupplySlot {
    supply: Supply,
    row: u32,
    tracking: Tracking,
}

const fn level(supply: Supply, row: u32) -> SupplySlot {
    SupplySlot {
        supply,
        row,
        tracking: Tracking::Level,
    }
}

const fn state(supply: Supply, row: u32) -> SupplySlot {
    SupplySlot {
        supply,
        row,
        tracking: Tracking::State,
    }
}

#[derive(Debug, Clone, Copy)]
struct Counter {
    oid: &'static str,
    addend: Option<&'static str>,
}

const fn counter(oid: &'static str) -> Option<Counter> {
    Some(Counter { oid, addend: None })
}

const fn counter_sum(oid: &'static str, addend: &'static str) -> Option<Counter> {
    Some(Counter {
        oid,
        addend: Some(addend),
    })
}

#[derive(Debug)]
struct VariantLayout {
    name: &'static str,
    name_oid: &'static str,
    total: Option<Counter>,
    color: Option<Counter>,
    mono: Option<Counter>,
    supplies: &'static [SupplySlot],
}

use Supply::*;

const STANDARD_SUPPLIES: &[SupplySlot] = &[
    level(Fuser, 9),
    level(Cleaner, 11),
    level(Transfer, 12),
    level(Waste, 10),
    level(BlackToner, 1),
    level(CyanToner, 2),
    level(MagentaToner, 3),
    level(YellowToner, 4),
    level(BlackDrum, 5),
    level(CyanDrum, 6),
    level(MagentaDrum, 7),
    level(YellowDrum, 8),
];

const VARIANTS: &[VariantLayout] = &[
    VariantLayout {
        name: "xerox",
        name_oid: SYS_NAME,
        total: counter(XRX_TOTAL),
        color: counter(XRX_COLOR),
        mono: counter(XRX_MONO),
        supplies: STANDARD_SUPPLIES,
    },
    // Xerox monochrome models: fuser only exposes its state
    VariantLayout {
        name: "xeroxbw",
        name_oid: SYS_DESCR,
        total: counter(XRX_TOTAL),
        color: counter(XRX_COLOR),
        mono: counter(XRX_MONO),
        supplies: &[state(Fuser, 40), level(BlackToner, 1), level(BlackDrum, 6)],
    },
    // AltaLink C8130: waste and fuser share row 9
    VariantLayout {
        name: "xeroxc8130",
        name_oid: SYS_NAME,
        total: counter(XRX_TOTAL),
        color: counter(XRX_COLOR),
        mono: counter(XRX_MONO),
        supplies: &[
            level(Fuser, 9),
            level(Cleaner, 10),
            level(Transfer, 11),
            level(Waste, 9),
            level(BlackToner, 1),
            level(CyanToner, 2),
            level(MagentaToner, 3),
            level(YellowToner, 4),
            level(BlackDrum, 5),
            level(CyanDrum, 6),
            level(MagentaDrum, 7),
            level(YellowDrum, 8),
        ],
    },
    // WorkCentre 3225
    VariantLayout {
        name: "xeroxwc3225",
        name_oid: SYS_NAME,
        total: counter(XRX_TOTAL),
        color: counter(XRX_COLOR),
        mono: counter(XRX_MONO),
        supplies: &[
            level(Fuser, 9),
            level(Cleaner, 11),
            level(Transfer, 12),
            level(Waste, 10),
            level(BlackToner, 1),
            level(CyanToner, 5),
            level(MagentaToner, 3),
            level(YellowToner, 4),
            level(BlackDrum, 2),
            level(CyanDrum, 6),
            level(MagentaDrum, 7),
            level(YellowDrum, 8),
        ],
    },
    // Phaser 7760
    VariantLayout {
        name: "xeroxphaser",
        name_oid: SYS_NAME,
        total: counter(XRX_TOTAL),
        color: counter(XRX_COLOR),
        mono: counter(XRX_MONO),
        supplies: &[
            level(Fuser, 6),
            level(Cleaner, 13),
            level(Transfer, 5),
            level(Waste, 7),
            level(BlackToner, 4),
            level(CyanToner, 1),
            level(MagentaToner, 2),
            level(YellowToner, 3),
            level(BlackDrum, 11),
            level(CyanDrum, 8),
            level(MagentaDrum, 9),
            level(YellowDrum, 10),
        ],
    },
    // VersaLink B400 / B405: maintenance kit is state-only
    VariantLayout {
        name: "xeroxvlb405",
        name_oid: SYS_DESCR,
        total: counter(XRX_TOTAL),
        color: counter(XRX_COLOR),
        mono: counter(XRX_MONO),
        supplies: &[state(Cleaner, 40), level(BlackToner, 1), level(BlackDrum, 6)],
    },
    // VersaLink C405
    VariantLayout {
        name: "xeroxvlc405",
        name_oid: SYS_NAME,
        total: counter(XRX_TOTAL),
        color: counter(XRX_COLOR),
        mono: counter(XRX_MONO),
        supplies: &[
            state(Fuser, 12),
            state(Cleaner, 39),
            state(Waste, 5),
            level(BlackToner, 1),
            level(CyanToner, 4),
            level(MagentaToner, 3),
            level(YellowToner, 2),
            level(BlackDrum, 41),
        ],
    },
    // VersaLink C505S
    VariantLayout {
        name: "xeroxvlc505s",
        name_oid: SYS_NAME,
        total: counter(XRX_TOTAL),
        color: counter(XRX_COLOR),
        mono: counter(XRX_MONO),
        supplies: &[
            state(Fuser, 12),
            state(Cleaner, 39),
            state(Transfer, 18),
            state(Waste, 5),
            level(BlackToner, 1),
            level(CyanToner, 4),
            level(MagentaToner, 3),
            level(YellowToner, 2),
            level(BlackDrum, 6),
            level(CyanDrum, 9),
            level(MagentaDrum, 8),
            level(YellowDrum, 7),
        ],
    },
    // HP LaserJet Color
    VariantLayout {
        name: "hp",
        name_oid: PRT_GENERAL_PRINTER_NAME,
        total: counter(HP_TOTAL),
        color: counter(HP_COLOR),
        mono: counter(HP_MONO),
        supplies: STANDARD_SUPPLIES,
    },
    // HP monochrome: mono counter sits on the Xerox-style identifier
    VariantLayout {
        name: "hpbw",
        name_oid: SYS_NAME,
        total: counter(HP_TOTAL),
        color: None,
        mono: counter(XRX_MONO),
        supplies: &[
            level(Fuser, 2),
            level(Cleaner, 11),
            level(Transfer, 12),
            level(Waste, 10),
            level(BlackToner, 1),
        ],
    },
    VariantLayout {
        name: "hpmfp",
        name_oid: PRT_GENERAL_PRINTER_NAME,
        total: counter(PRT_MARKER_LIFE_COUNT),
        color: counter(HP_COLOR),
        mono: counter(PRT_MARKER_LIFE_COUNT),
        supplies: STANDARD_SUPPLIES,
    },
    // HP LaserJet MFP M426
    VariantLayout {
        name: "hpm426",
        name_oid: PRT_GENERAL_PRINTER_NAME,
        total: counter(PRT_MARKER_LIFE_COUNT),
        color: None,
        mono: counter(PRT_MARKER_LIFE_COUNT),
        supplies: &[level(BlackToner, 1)],
    },
    // HP M725: the cleaner row holds the maintenance kit, which is not reported
    VariantLayout {
        name: "hpm725bw",
        name_oid: SYS_NAME,
        total: counter(HP_TOTAL),
        color: None,
        mono: counter(XRX_MONO),
        supplies: &[
            level(Fuser, 2),
            level(Transfer, 12),
            level(Waste, 10),
            level(BlackToner, 1),
        ],
    },
    // Kyocera monochrome
    VariantLayout {
        name: "kcsw",
        name_oid: SYS_NAME,
        total: counter(KYO_TOTAL),
        color: None,
        mono: counter(KYO_TOTAL),
        supplies: &[
            level(Fuser, 9),
            level(Transfer, 12),
            level(Waste, 10),
            level(BlackToner, 1),
        ],
    },
    // Develop ineo 450 and equivalent Konica Minolta models
    VariantLayout {
        name: "dicl",
        name_oid: SYS_DESCR,
        total: counter(PRT_MARKER_LIFE_COUNT),
        color: counter_sum(DEV_PRINT_COLOR, DEV_COPY_COLOR),
        mono: counter_sum(DEV_PRINT_MONO, DEV_COPY_MONO),
        supplies: &[
            level(Fuser, 14),
            level(Cleaner, 16),
            level(Transfer, 15),
            state(Waste, 13),
            level(BlackToner, 4),
            level(CyanToner, 1),
            level(MagentaToner, 2),
            level(YellowToner, 3),
            level(BlackDrum, 11),
            level(CyanDrum, 5),
            level(MagentaDrum, 7),
            level(YellowDrum, 9),
        ],
    },
    // OKI: row 9 is the transfer belt
    VariantLayout {
        name: "oki",
        name_oid: SYS_NAME,
        total: counter(OKI_TOTAL),
        color: counter(OKI_COLOR),
        mono: counter(OKI_MONO),
        supplies: &[
            level(Fuser, 10),
            level(Transfer, 9),
            level(BlackToner, 1),
            level(CyanToner, 2),
            level(MagentaToner, 3),
            level(YellowToner, 4),
            level(BlackDrum, 5),
            level(CyanDrum, 6),
            level(MagentaDrum, 7),
            level(YellowDrum, 8),
        ],
    },
    // OKI C911
    VariantLayout {
        name: "okic911",
        name_oid: SYS_NAME,
        total: counter(XRX_TOTAL),
        color: counter(XRX_COLOR),
        mono: counter(XRX_MONO),
        supplies: &[
            level(Fuser, 10),
            level(Transfer, 9),
            level(Waste, 11),
            level(BlackToner, 1),
            level(CyanToner, 2),
            level(MagentaToner, 3),
            level(YellowToner, 4),
            level(BlackDrum, 5),
            level(CyanDrum, 6),
            level(MagentaDrum, 7),
            level(YellowDrum, 8),
        ],
    },
];

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Ordered field list for a variant. The name is matched case-insensitively.
pub fn fields_for(variant: &str) -> Result<Vec<FieldSpec>> {
    let wanted = variant.trim().to_ascii_lowercase();
    let layout = VARIANTS
        .iter()
        .find(|v| v.name == wanted)
        .ok_or_else(|| MonitorError::UnknownVariant {
            variant: variant.to_string(),
        })?;
    Ok(expand(layout))
}

/// Names of all registered variants.
pub fn variant_names() -> impl Iterator<Item = &'static str> {
    VARIANTS.iter().map(|v| v.name)
}

fn expand(layout: &VariantLayout) -> Vec<FieldSpec> {
    let mut fields = vec![
        FieldSpec::identity("name", layout.name_oid),
        FieldSpec::identity("model", HR_DEVICE_DESCR),
        FieldSpec::identity("meta", SYS_DESCR),
    ];

    let counters = [
        ("print_count", layout.total),
        ("print_color", layout.color),
        ("print_mono", layout.mono),
    ];
    for (field, counter) in counters {
        let Some(counter) = counter else { continue };
        fields.push(FieldSpec {
            field,
            oid: counter.oid.to_string(),
            label_oid: None,
            conversion: match counter.addend {
                Some(addend) => Conversion::Sum {
                    addend_oid: addend.to_string(),
                },
                None => Conversion::Identity,
            },
        });
    }

    for slot in layout.supplies {
        fields.push(FieldSpec {
            field: slot.supply.field(),
            oid: supply_oid(COL_LEVEL, slot.row),
            label_oid: Some(supply_oid(COL_DESCRIPTION, slot.row)),
            conversion: match slot.tracking {
                Tracking::Level => Conversion::Percentage {
                    capacity_oid: supply_oid(COL_MAX_CAPACITY, slot.row),
                },
                Tracking::State => Conversion::Status {
                    codes: SUPPLY_LEVEL_STATES,
                },
            },
        });
    }

    fields
}

fn supply_oid(column: u32, row: u32) -> String {
    format!("{SUPPLIES_TABLE}.{column}.1.{row}")
}
