//! Clinical keyword dictionaries.
//!
//! Order matters: ties between regions and between location counts are
//! broken by dictionary order.

pub type Dictionary = &'static [(&'static str, &'static [&'static str])];

pub const REGION_KEYWORDS: Dictionary = &[
    ("tibial_plateau", &[
        "tibial plateau",
        "schatzker",
        "proximal tibia",
        "lateral tibial plateau",
        "medial tibial plateau",
    ]),
    ("pelvis", &[
        "pelvic fracture",
        "pelvis",
        "pelvic ring",
        "acetabulum",
        "acetabular",
        "pubic ramus",
        "iliac",
    ]),
    ("distal_radius", &[
        "distal radius",
        "radius fracture",
        "colles",
        "smith fracture",
        "wrist fracture",
    ]),
];

pub const TYPE_KEYWORDS: Dictionary = &[
    ("intra_articular", &["intra-articular", "intra articular"]),
    ("extra_articular", &["extra-articular", "extra articular"]),
    ("comminuted",      &["comminuted"]),
    ("displaced",       &["displaced", "displacement"]),
    ("open",            &["open fracture"]),
    ("closed",          &["closed fracture"]),
];

// Side keywords carry surrounding spaces so "left" inside other words
// (e.g. "cleft") does not count.
pub const LOCATION_KEYWORDS: Dictionary = &[
    ("proximal",  &["proximal"]),
    ("distal",    &["distal"]),
    ("left",      &[" left ", " lt ", " left-sided"]),
    ("right",     &[" right ", " rt ", " right-sided"]),
    ("medial",    &["medial"]),
    ("lateral",   &["lateral"]),
    ("posterior", &["posterior"]),
    ("anterior",  &["anterior"]),
];

pub const SIDE_LABELS: [&str; 2] = ["left", "right"];
pub const ZONE_LABELS: [&str; 2] = ["proximal", "distal"];
