//! Picks a representative card image for a place from its name and kind.
//!
//! Keyword buckets are checked in order and the first hit wins. Names that
//! match nothing get a random default for their kind. There is no accuracy
//! claim here; only the keyword path is deterministic.

use healthmap_core::{ImageBucket, ImageRef, PlaceKind};

use crate::random::{pick_index, RandomSource};

const HOSPITAL_DEFAULTS: [&str; 3] = [
    "https://images.unsplash.com/photo-1587351021759-3e566b9af923?auto=format&fit=crop&q=80&w=400&h=250",
    "https://images.unsplash.com/photo-1519494026892-80bbd2d6fd0d?auto=format&fit=crop&q=80&w=400&h=250",
    "https://images.unsplash.com/photo-1586773860418-d37222d8fce3?auto=format&fit=crop&q=80&w=400&h=250",
];
const DENTAL: &str =
    "https://images.unsplash.com/photo-1606811841689-23dfddce3e95?auto=format&fit=crop&q=80&w=400&h=250";
const EYE: &str =
    "https://images.unsplash.com/photo-1579684385127-1ef15d508118?auto=format&fit=crop&q=80&w=400&h=250";
const PHARMACY: &str =
    "https://images.unsplash.com/photo-1576602976047-174e57a47881?auto=format&fit=crop&q=80&w=400&h=250";

const GROCERY_DEFAULTS: [&str; 3] = [
    "https://images.unsplash.com/photo-1578916171728-46686eac8d58?auto=format&fit=crop&q=80&w=400&h=250",
    "https://images.unsplash.com/photo-1542838132-92c53300491e?auto=format&fit=crop&q=80&w=400&h=250",
    "https://images.unsplash.com/photo-1604719312566-b7e2b0084adb?auto=format&fit=crop&q=80&w=400&h=250",
];
const PRODUCE: &str =
    "https://images.unsplash.com/photo-1610832958506-aa56368176cf?auto=format&fit=crop&q=80&w=400&h=250";
const VEGETABLE: &str =
    "https://images.unsplash.com/photo-1597362925123-77861d3fbac7?auto=format&fit=crop&q=80&w=400&h=250";
const CONVENIENCE: &str =
    "https://images.unsplash.com/photo-1534723452862-4c874018d66d?auto=format&fit=crop&q=80&w=400&h=250";

struct KeywordBucket {
    keywords: &'static [&'static str],
    image: ImageRef,
}

const HOSPITAL_BUCKETS: &[KeywordBucket] = &[
    KeywordBucket {
        keywords: &["dental", "dentist", "smile"],
        image: ImageRef {
            bucket: ImageBucket::Dental,
            url: DENTAL,
        },
    },
    KeywordBucket {
        keywords: &["eye", "vision", "optical"],
        image: ImageRef {
            bucket: ImageBucket::Eye,
            url: EYE,
        },
    },
    KeywordBucket {
        keywords: &["pharm", "medic"],
        image: ImageRef {
            bucket: ImageBucket::Pharmacy,
            url: PHARMACY,
        },
    },
];

const GROCERY_BUCKETS: &[KeywordBucket] = &[
    KeywordBucket {
        keywords: &["fruit", "mandi"],
        image: ImageRef {
            bucket: ImageBucket::Produce,
            url: PRODUCE,
        },
    },
    KeywordBucket {
        keywords: &["veg", "green"],
        image: ImageRef {
            bucket: ImageBucket::Vegetable,
            url: VEGETABLE,
        },
    },
    KeywordBucket {
        keywords: &["mart", "super"],
        image: ImageRef {
            bucket: ImageBucket::Convenience,
            url: CONVENIENCE,
        },
    },
];

/// Chooses the card image for a place.
///
/// `random` is consulted only when no keyword matches.
#[must_use]
pub fn choose_image(name: &str, kind: PlaceKind, random: &dyn RandomSource) -> ImageRef {
    let lower = name.to_lowercase();
    let (buckets, defaults, default_bucket) = match kind {
        PlaceKind::Hospital => (
            HOSPITAL_BUCKETS,
            &HOSPITAL_DEFAULTS,
            ImageBucket::HospitalDefault,
        ),
        PlaceKind::Grocery => (
            GROCERY_BUCKETS,
            &GROCERY_DEFAULTS,
            ImageBucket::GroceryDefault,
        ),
    };

    if let Some(hit) = buckets
        .iter()
        .find(|b| b.keywords.iter().any(|k| lower.contains(k)))
    {
        return hit.image;
    }

    ImageRef {
        bucket: default_bucket,
        url: defaults[pick_index(random, defaults.len())],
    }
}
