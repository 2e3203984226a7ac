//! Wearable slots, option categories and the name catalog.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::WardrobeError;

/// Attachment slot on the avatar. At most one wearable per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Hat,
    Shirt,
    Eyes,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::Hat, Slot::Shirt, Slot::Eyes];

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Slot::Hat => 0,
            Slot::Shirt => 1,
            Slot::Eyes => 2,
        }
    }

    /// Display label ("Hat", "Shirt", "Eyes").
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Slot::Hat => "Hat",
            Slot::Shirt => "Shirt",
            Slot::Eyes => "Eyes",
        }
    }

    /// Lower-case key used in selection values ("hat", "shirt", "eyes").
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Slot::Hat => "hat",
            Slot::Shirt => "shirt",
            Slot::Eyes => "eyes",
        }
    }

    #[must_use]
    pub const fn category(self) -> Category {
        match self {
            Slot::Hat => Category::Hat,
            Slot::Shirt => Category::Shirt,
            Slot::Eyes => Category::Eyes,
        }
    }

    /// Hat and Eyes hang off the head bone.
    #[inline]
    #[must_use]
    pub const fn is_head_slot(self) -> bool {
        !matches!(self, Slot::Shirt)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Slot {
    type Err = WardrobeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hat" | "hats" => Ok(Slot::Hat),
            "shirt" | "shirts" => Ok(Slot::Shirt),
            "eyes" | "eye" => Ok(Slot::Eyes),
            other => Err(WardrobeError::InvalidInput(format!("unknown slot '{other}'"))),
        }
    }
}

/// Kind of catalog entry: a base-model fur or one of the wearable slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Fur,
    Hat,
    Shirt,
    Eyes,
}

impl Category {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Category::Fur => "Fur",
            Category::Hat => "Hat",
            Category::Shirt => "Shirt",
            Category::Eyes => "Eyes",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Available option names per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub furs: Vec<String>,
    pub hats: Vec<String>,
    pub shirts: Vec<String>,
    pub eyes: Vec<String>,
}

impl Catalog {
    #[must_use]
    pub fn options(&self, category: Category) -> &[String] {
        match category {
            Category::Fur => &self.furs,
            Category::Hat => &self.hats,
            Category::Shirt => &self.shirts,
            Category::Eyes => &self.eyes,
        }
    }

    /// Exact, case-sensitive membership.
    #[must_use]
    pub fn contains(&self, category: Category, name: &str) -> bool {
        self.options(category).iter().any(|option| option == name)
    }

    /// Rejects names that are not in the catalog.
    pub fn validate(&self, category: Category, name: &str) -> Result<(), WardrobeError> {
        if self.contains(category, name) {
            Ok(())
        } else {
            Err(WardrobeError::UnknownOption {
                category,
                name: name.to_string(),
            })
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        let owned = |list: &[&str]| list.iter().map(|s| (*s).to_string()).collect();
        Self {
            furs: owned(DEFAULT_FURS),
            hats: owned(DEFAULT_HATS),
            shirts: owned(DEFAULT_SHIRTS),
            eyes: owned(DEFAULT_EYES),
        }
    }
}

/// Joins `folder` and `file_name` into a relative URI, percent-encoding each
/// path segment. Slashes in `folder` separate segments; the file name is
/// always a single segment.
#[must_use]
pub fn encode_path(folder: &str, file_name: &str) -> String {
    let Ok(mut url) = Url::parse("asset:/") else {
        return format!("{folder}/{file_name}");
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear();
        segments.extend(folder.split('/').filter(|s| !s.is_empty()));
        segments.push(file_name);
    }
    url.path().trim_start_matches('/').to_string()
}

pub const DEFAULT_FURS: &[&str] = &[
    "OG", "Red", "Orange", "Green", "Blue", "Pink", "Purple", "Blue-Tiger", "Red-Tiger",
    "Neon-Tiger", "Tiger", "Green-Dots", "Purple-Dots", "Robo-1", "Robo-2", "Zombie", "Galaxy",
    "Gold", "SpecialPink",
];

pub const DEFAULT_HATS: &[&str] = &[
    "Afro-Rainbow", "Antlers", "Backwards-Hat", "Backwards-Hat-Red-v2",
    "Backwards-Hat-Yellow-Purple", "Banana", "Bandana", "Bandana-Red", "Beanie", "Beanie-Orange",
    "Beanie-Orange-v2", "Beanie-Stealth", "Beret-Green", "Bow", "Bucket", "Bucket-Orange",
    "Bucket-Snow-Tan", "Bunny", "Captain", "Captain-Gold", "Chef", "Clouds", "Cone", "Cowboy",
    "Cowboy-Stealth", "Crown", "Ducky", "Fisherman", "Flipped-Brim-Blue", "Flipped-Brim-Red-v2",
    "Frog", "Fuzzy-Bucket", "Fuzzy-Bucket-Blue-Yellow", "Fuzzy-Bucket-Green-Stealth v2",
    "Fuzzy-Bucket-Orange-Blue", "Fuzzy-Bucket-Pink-Green", "Fuzzy-Bucket-Snow",
    "Fuzzy-Bucket-Snow-Red", "Fuzzy-Bucket-Stealth", "Fuzzy-Bucket-Stealth-Red",
    "Fuzzy-Bucket-Stealth-Teal", "Green-Dino", "Halo", "Hat-Red-v2", "Hat-Stealth-v2",
    "Helmet Green", "Horns", "Island", "Mowhawk-Green", "Mowhawk-Stealth", "Mushroom-Green",
    "Mushroom-Red", "Pineapple", "Pink-Dino", "Pirate", "Plumber", "Plumber-v2", "Plumber-v3",
    "Plumber-v4", "Plumber-v5", "Pot-of-Gold", "Propeller", "Sailor", "Sensei", "Shark",
    "Space-Helmet-Gold", "Space-Helmet-v2", "Spikey-Hair", "Spikey-Hair-Rose", "Spikey-Hair-Teal",
    "Spikey-Hair-v2", "Spikey-Hair-Yellow", "Sportband-OG", "Taco", "Top-Hat-v3", "Uni-Horn",
    "Viking-Helmet", "Viking-Helmet-Gold", "Viking-Helmet-Red", "Viking-Helmet-Silver", "Visor",
    "Watermelon", "Whale", "Wizard Teal", "Wizard-Blue",
];

pub const DEFAULT_SHIRTS: &[&str] = &[
    "Apron-Fishy", "Apron", "Baseball-Blue-Orange-v2", "Baseball-Green-Yellow",
    "Baseball-Mint-Stealth", "Baseball-Snow-Blue-v2", "Baseball-Snow-Purple",
    "Baseball-Snow-Stealth", "Basketball-Blue", "Basketball-Gold", "Basketball-Green",
    "Basketball-Purple-v2", "Basketball-Purple", "Basketball-Red", "Bathrobe", "Bowtie",
    "Business-v2", "Business", "Camo-Green-v2", "Cowboy-Vest", "Fishdolier", "Football-Blue-Red",
    "Football-Purple-Yellow", "Football-Stealth", "Golf-Red", "Hockey-Blue-Orange",
    "Hockey-Red-Blue", "Kimono-Blue-Flowers", "Kimono-Pink-Flowers", "Kimono-Purple-Red",
    "Kimono-Snow-Brown-v2", "Mech-Suit", "Ninja", "Overalls-Orange", "Overalls-v2", "Overalls-v3",
    "Puffy-Jacket-Stripes-v8", "Puffy-Jacket-Stripes-v9", "Puffy-Sleeves", "Robe-Purple", "Scuba",
    "Soccer-Mint-Fishy", "Soccer-Stealth", "Spacesuit-Gold", "Spacesuit-v3", "Supersuit-v10",
    "Supersuit-v2", "Supersuit-v3", "Supersuit-v4", "Supersuit-v5", "Supersuit-v6", "Supersuit-v7",
    "Supersuit-v8", "Supersuit-v9", "Supersuit", "Sweater-Yellow", "Sweater", "T-Shirt-Blue-Fishy",
    "T-Shirt-Meme", "T-Shirt", "Tracksuit-Red", "Tracksuit-Yellow-Stealth", "Tux-Gold",
    "Tux-Purple", "Tux-Snow", "Tux-Stealth", "Vest", "Warmup-Blue-Orange", "Warmup-Blue-Snow",
    "Warmup-Blue-Stealth", "Warmup-Mint-Snow", "Warmup-Pink-Orange", "Warmup-Purple-Red",
    "Warmup-Purple-Yellow", "Warmup-Stealth", "Wings", "Wizard-Cloak-Green", "Wizard-Cloak-Pink",
    "Wizard-Cloak-Teal",
];

pub const DEFAULT_EYES: &[&str] = &[
    "3D", "Angry", "Cartoon", "Cartoon Glossy", "Cartoon Third Eye", "Cartoon Third Eye Glossy",
    "Circle-Shades", "Crazy", "Cyclops", "Default", "Determined", "Droopy", "Evil", "Eyepatch",
    "Floating", "Happy", "Heart", "Laser-Blue", "Laser-Green", "Laser-Red", "Meme", "Perplexed",
    "Punk", "Scanner Gold", "Scanner Red", "Scanner Teal", "Shades", "Slick", "Three", "Tired",
    "Triangles", "Viper Gold", "Viper Green", "Viper Purple", "Viper-Rainbow", "Viper-Red", "VR",
    "VR-Green", "VR-Red", "Yellow-Scanner", "Zombie", "Zombie-Blue", "Zombie-Green", "Zombie-Mint",
    "Zombie-Orange", "Zombie-Pink", "Zombie-Purple", "Zombie-Red", "Zombie-Yellow",
];
