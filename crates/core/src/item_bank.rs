//! Static item bank for the Mini-IPIP6 six-factor inventory.
//!
//! Item parameters are Sibley (2012) Table 2 values — fixed, pre-calibrated
//! inputs. The bank is the one genuinely immutable, process-wide global in
//! this crate; everything else is explicit state passed by the caller.

use crate::error::{CatError, Result};
use serde::{Deserialize, Serialize};

/// The six Mini-IPIP6 personality factors, in canonical ordering.
///
/// The ordering matters: it is the tie-break and round-robin order used by
/// [`crate::controller`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trait {
    Extraversion,
    Agreeableness,
    Conscientiousness,
    Neuroticism,
    Openness,
    HonestyHumility,
}

impl Trait {
    /// Canonical ordering over the six traits.
    pub const ALL: [Trait; 6] = [
        Trait::Extraversion,
        Trait::Agreeableness,
        Trait::Conscientiousness,
        Trait::Neuroticism,
        Trait::Openness,
        Trait::HonestyHumility,
    ];

    /// The `snake_case` slug used by serde (and therefore by the CSV
    /// persisted format) — `"honesty_humility"`, not `"HonestyHumility"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Trait::Extraversion => "extraversion",
            Trait::Agreeableness => "agreeableness",
            Trait::Conscientiousness => "conscientiousness",
            Trait::Neuroticism => "neuroticism",
            Trait::Openness => "openness",
            Trait::HonestyHumility => "honesty_humility",
        }
    }
}

impl std::fmt::Display for Trait {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable item record.
///
/// Invariant: `beta` is sorted strictly ascending; `alpha > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    #[serde(rename = "trait")]
    pub trait_: Trait,
    pub reverse_keyed: bool,
    pub alpha: f64,
    pub beta: [f64; 6],
}

/// Item text in both reference-repository language variants. Opaque to the
/// core: it is never read by the IRT kernel or the controller, only handed
/// back to the host inside [`crate::session::Action::PresentItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemText {
    pub en: &'static str,
    pub kr: &'static str,
}

macro_rules! item {
    ($id:expr, $trait:expr, $rev:expr, $alpha:expr, $beta:expr) => {
        Item {
            id: $id,
            trait_: $trait,
            reverse_keyed: $rev,
            alpha: $alpha,
            beta: $beta,
        }
    };
}

/// The 24 Mini-IPIP6 items, Sibley (2012) Table 2 parameters.
pub const ITEM_BANK: [Item; 24] = [
    // Extraversion
    item!(1, Trait::Extraversion, false, 1.07, [-1.85, -1.04, -0.21, 0.89, 1.98, 2.76]),
    item!(7, Trait::Extraversion, true, 0.84, [-2.82, -1.67, -0.80, 0.10, 0.86, 1.91]),
    item!(19, Trait::Extraversion, true, 1.00, [-2.51, -1.32, -0.49, 0.45, 1.23, 2.44]),
    item!(23, Trait::Extraversion, false, 0.92, [-2.25, -1.27, -0.54, 0.24, 0.97, 1.96]),
    // Agreeableness
    item!(2, Trait::Agreeableness, false, 1.46, [-3.19, -2.51, -1.86, -1.19, -0.28, 0.99]),
    item!(8, Trait::Agreeableness, true, 0.66, [-3.74, -2.51, -1.59, -0.76, 0.22, 1.76]),
    item!(14, Trait::Agreeableness, false, 1.12, [-3.15, -2.36, -1.70, -0.92, 0.03, 1.37]),
    item!(20, Trait::Agreeableness, true, 0.81, [-3.77, -2.69, -1.94, -1.19, -0.28, 1.25]),
    // Conscientiousness
    item!(3, Trait::Conscientiousness, false, 0.90, [-3.39, -2.13, -1.18, -0.27, 0.57, 1.64]),
    item!(10, Trait::Conscientiousness, false, 0.85, [-3.49, -2.72, -2.02, -1.06, -0.20, 1.12]),
    item!(11, Trait::Conscientiousness, true, 0.77, [-4.21, -2.93, -2.05, -1.07, -0.18, 1.38]),
    item!(22, Trait::Conscientiousness, true, 0.94, [-2.63, -1.73, -1.17, -0.64, -0.09, 1.11]),
    // Neuroticism
    item!(4, Trait::Neuroticism, false, 1.13, [-1.32, -0.23, 0.36, 1.04, 1.72, 2.53]),
    item!(15, Trait::Neuroticism, true, 0.77, [-2.24, -0.70, 0.38, 1.48, 2.57, 3.92]),
    item!(16, Trait::Neuroticism, false, 0.90, [-2.15, -0.76, 0.05, 0.89, 1.72, 2.80]),
    item!(17, Trait::Neuroticism, true, 0.65, [-2.82, -1.01, -0.19, 0.76, 1.80, 3.15]),
    // Openness
    item!(5, Trait::Openness, false, 0.54, [-4.22, -2.68, -1.52, -0.21, 0.94, 2.47]),
    item!(9, Trait::Openness, true, 1.10, [-2.70, -1.72, -1.00, -0.17, 0.47, 1.61]),
    item!(13, Trait::Openness, true, 0.79, [-3.45, -2.35, -1.56, -0.85, -0.11, 1.13]),
    item!(21, Trait::Openness, true, 1.24, [-2.57, -1.71, -1.12, -0.29, 0.41, 1.43]),
    // Honesty-Humility
    item!(6, Trait::HonestyHumility, true, 0.91, [-3.43, -2.67, -1.89, -1.10, -0.42, 0.71]),
    item!(12, Trait::HonestyHumility, true, 1.17, [-2.32, -1.69, -1.08, -0.33, 0.17, 0.99]),
    item!(18, Trait::HonestyHumility, true, 1.47, [-1.92, -1.42, -0.97, -0.52, -0.16, 0.48]),
    item!(24, Trait::HonestyHumility, true, 1.16, [-2.08, -1.30, -0.71, -0.12, 0.31, 1.10]),
];

static_assertions::const_assert_eq!(ITEM_BANK.len(), 24);

/// Item text, English and Korean, indexed in the same order as [`ITEM_BANK`].
pub const ITEM_TEXT: [ItemText; 24] = [
    ItemText { en: "Am the life of the party.", kr: "나는 파티의 분위기 메이커이다." },
    ItemText { en: "Don't talk a lot.", kr: "나는 말을 많이 하지 않는다." },
    ItemText { en: "Keep in the background.", kr: "나는 뒤에서 조용히 있는 편이다." },
    ItemText { en: "Talk to a lot of different people at parties.", kr: "나는 파티에서 다양한 사람들과 대화한다." },
    ItemText { en: "Sympathize with others' feelings.", kr: "나는 다른 사람들의 감정에 공감한다." },
    ItemText { en: "Am not interested in other people's problems.", kr: "나는 다른 사람들의 문제에 관심이 없다." },
    ItemText { en: "Feel others' emotions.", kr: "나는 다른 사람들의 감정을 느낀다." },
    ItemText { en: "Am not really interested in others.", kr: "나는 다른 사람들에게 별로 관심이 없다." },
    ItemText { en: "Get chores done right away.", kr: "나는 집안일을 바로바로 처리한다." },
    ItemText { en: "Like order.", kr: "나는 질서를 좋아한다." },
    ItemText { en: "Make a mess of things.", kr: "나는 일을 엉망으로 만든다." },
    ItemText { en: "Often forget to put things back in their proper place.", kr: "나는 물건을 제자리에 돌려놓는 것을 자주 잊어버린다." },
    ItemText { en: "Have frequent mood swings.", kr: "나는 기분 변화가 자주 있다." },
    ItemText { en: "Am relaxed most of the time.", kr: "나는 대부분의 시간 동안 편안하다." },
    ItemText { en: "Get upset easily.", kr: "나는 쉽게 화가 난다." },
    ItemText { en: "Seldom feel blue.", kr: "나는 거의 우울하지 않다." },
    ItemText { en: "Have a vivid imagination.", kr: "나는 생생한 상상력을 가지고 있다." },
    ItemText { en: "Have difficulty understanding abstract ideas.", kr: "나는 추상적인 아이디어를 이해하는 데 어려움이 있다." },
    ItemText { en: "Do not have a good imagination.", kr: "나는 상상력이 좋지 않다." },
    ItemText { en: "Am not interested in abstract ideas.", kr: "나는 추상적인 아이디어에 관심이 없다." },
    ItemText { en: "Feel entitled to more of everything.", kr: "나는 모든 것에서 더 많은 것을 받을 자격이 있다고 느낀다." },
    ItemText { en: "Deserve more things in life.", kr: "나는 인생에서 더 많은 것을 받을 자격이 있다." },
    ItemText { en: "Would like to be seen driving around in a very expensive car.", kr: "나는 매우 비싼 차를 운전하는 모습을 보여주고 싶다." },
    ItemText { en: "Would get a lot of pleasure from owning expensive luxury goods.", kr: "나는 비싼 명품을 소유하는 것에서 큰 즐거움을 얻을 것이다." },
];

/// Look up an item by id. Ids run 1..=24 and are not contiguous with the
/// bank's storage index, so this is a linear scan rather than `[id - 1]`.
pub fn get(id: u32) -> Result<&'static Item> {
    ITEM_BANK
        .iter()
        .find(|item| item.id == id)
        .ok_or(CatError::UnknownItem(id))
}

/// Item text for an item id. Panics on an unknown id — callers are expected
/// to have already resolved the id through [`get`].
pub fn text(id: u32, lang: Lang) -> &'static str {
    let idx = ITEM_BANK
        .iter()
        .position(|item| item.id == id)
        .expect("item id already validated by get()");
    match lang {
        Lang::En => ITEM_TEXT[idx].en,
        Lang::Kr => ITEM_TEXT[idx].kr,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    En,
    Kr,
}

/// All items for a trait, in bank order (always 4, ascending by id within
/// the bank's declaration order).
pub fn items_for_trait(trait_: Trait) -> impl Iterator<Item = &'static Item> {
    ITEM_BANK.iter().filter(move |item| item.trait_ == trait_)
}

/// The item with the highest discrimination for a trait — the cold-start
/// pick. Ties broken by smallest item id, matching the controller's
/// tie-break rule.
pub fn highest_alpha_item(trait_: Trait) -> &'static Item {
    items_for_trait(trait_)
        .max_by(|a, b| {
            a.alpha
                .partial_cmp(&b.alpha)
                .unwrap()
                .then(b.id.cmp(&a.id))
        })
        .expect("every trait has exactly four items")
}

/// A single row of the persisted item-bank format: `id, trait,
/// reverse_keyed, alpha, beta1..beta6`. Used to load an externally supplied
/// (e.g. recalibrated) item table; the embedded [`ITEM_BANK`] remains the
/// default and is not replaced by loading this — it is up to the host to
/// decide whether to substitute it.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct ItemRecord {
    id: u32,
    #[serde(rename = "trait")]
    trait_: Trait,
    reverse_keyed: bool,
    alpha: f64,
    beta1: f64,
    beta2: f64,
    beta3: f64,
    beta4: f64,
    beta5: f64,
    beta6: f64,
}

impl From<ItemRecord> for Item {
    fn from(r: ItemRecord) -> Self {
        Item {
            id: r.id,
            trait_: r.trait_,
            reverse_keyed: r.reverse_keyed,
            alpha: r.alpha,
            beta: [r.beta1, r.beta2, r.beta3, r.beta4, r.beta5, r.beta6],
        }
    }
}

/// Parse a CSV item table in the persisted format described in the external
/// interfaces contract. Returns items in file order; does not validate the
/// "exactly four items per trait" invariant — that is the loading host's
/// responsibility if it intends to substitute the embedded bank.
pub fn parse_items_csv(data: &str) -> std::result::Result<Vec<Item>, csv::Error> {
    let mut reader = csv::Reader::from_reader(data.as_bytes());
    reader
        .deserialize::<ItemRecord>()
        .map(|row| row.map(Item::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_has_four_items_per_trait() {
        for trait_ in Trait::ALL {
            assert_eq!(items_for_trait(trait_).count(), 4);
        }
    }

    #[test]
    fn beta_thresholds_strictly_ascending() {
        for item in ITEM_BANK {
            for window in item.beta.windows(2) {
                assert!(window[0] < window[1], "item {} beta not ascending", item.id);
            }
        }
    }

    #[test]
    fn alpha_is_positive() {
        for item in ITEM_BANK {
            assert!(item.alpha > 0.0, "item {} has non-positive alpha", item.id);
        }
    }

    #[test]
    fn get_rejects_unknown_id() {
        assert_eq!(get(0), Err(CatError::UnknownItem(0)));
        assert_eq!(get(25), Err(CatError::UnknownItem(25)));
    }

    #[test]
    fn cold_start_agreeableness_is_item_2() {
        // S3: highest-alpha Agreeableness item has alpha = 1.46 (item 2).
        let item = highest_alpha_item(Trait::Agreeableness);
        assert_eq!(item.id, 2);
        assert!((item.alpha - 1.46).abs() < 1e-9);
    }

    #[test]
    fn parse_csv_round_trips_embedded_bank() {
        let mut csv = String::from("id,trait,reverse_keyed,alpha,beta1,beta2,beta3,beta4,beta5,beta6\n");
        for item in ITEM_BANK {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{},{},{}\n",
                item.id,
                item.trait_.as_str(),
                item.reverse_keyed,
                item.alpha,
                item.beta[0],
                item.beta[1],
                item.beta[2],
                item.beta[3],
                item.beta[4],
                item.beta[5],
            ));
        }
        let parsed = parse_items_csv(&csv).expect("valid csv should parse");
        assert_eq!(parsed.len(), 24);
        assert_eq!(parsed[1].trait_, ITEM_BANK[1].trait_);
        assert!((parsed[4].alpha - ITEM_BANK[4].alpha).abs() < 1e-12);
    }
}
