use std::fmt;

use serde::{Deserialize, Serialize};

/// Chapter ids the game writes, in story order.
pub const CHAPTER_IDS: [u64; 13] = [1, 3, 4, 5, 6, 7, 9, 10, 12, 14, 15, 16, 17];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Chapter {
    VillageIntro,
    ANewFriend,
    GettingToKnowEachOther,
    TheCave,
    TheHighlands,
    TheSwamp,
    TheShipwreck,
    InControl,
    Archipelago1,
    TheDesert,
    TheDesertHut,
    TheRobotBase,
    Home,
    Unknown(u64),
}

impl Chapter {
    pub const ALL: [Chapter; 13] = [
        Self::VillageIntro,
        Self::ANewFriend,
        Self::GettingToKnowEachOther,
        Self::TheCave,
        Self::TheHighlands,
        Self::TheSwamp,
        Self::TheShipwreck,
        Self::InControl,
        Self::Archipelago1,
        Self::TheDesert,
        Self::TheDesertHut,
        Self::TheRobotBase,
        Self::Home,
    ];

    pub fn from_raw(raw: u64) -> Self {
        match raw {
            1 => Self::VillageIntro,
            3 => Self::ANewFriend,
            4 => Self::GettingToKnowEachOther,
            5 => Self::TheCave,
            6 => Self::TheHighlands,
            7 => Self::TheSwamp,
            9 => Self::TheShipwreck,
            10 => Self::InControl,
            12 => Self::Archipelago1,
            14 => Self::TheDesert,
            15 => Self::TheDesertHut,
            16 => Self::TheRobotBase,
            17 => Self::Home,
            other => Self::Unknown(other),
        }
    }

    pub fn raw(&self) -> u64 {
        match *self {
            Self::VillageIntro => 1,
            Self::ANewFriend => 3,
            Self::GettingToKnowEachOther => 4,
            Self::TheCave => 5,
            Self::TheHighlands => 6,
            Self::TheSwamp => 7,
            Self::TheShipwreck => 9,
            Self::InControl => 10,
            Self::Archipelago1 => 12,
            Self::TheDesert => 14,
            Self::TheDesertHut => 15,
            Self::TheRobotBase => 16,
            Self::Home => 17,
            Self::Unknown(other) => other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::VillageIntro => "Village Intro",
            Self::ANewFriend => "A New Friend",
            Self::GettingToKnowEachOther => "Getting to know each other",
            Self::TheCave => "The Cave",
            Self::TheHighlands => "The Highlands",
            Self::TheSwamp => "The Swamp",
            Self::TheShipwreck => "The Shipwreck",
            Self::InControl => "In Control",
            Self::Archipelago1 => "Archipelago 1",
            Self::TheDesert => "The Desert",
            Self::TheDesertHut => "The Desert Hut",
            Self::TheRobotBase => "The Robot Base",
            Self::Home => "Home",
            Self::Unknown(_) => "Unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl fmt::Display for Chapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Unknown(v) => write!(f, "Unknown ({})", v),
            _ => f.write_str(self.as_str()),
        }
    }
}
