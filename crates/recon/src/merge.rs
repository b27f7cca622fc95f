use indexmap::IndexMap;

use crate::model::{EnrichedRecord, MergedProduct, SpecMap, SpecValue};

/// Merge `other` into `running`, key by key.
///
/// New keys are appended verbatim. An existing list gains each incoming
/// item it does not already hold. An existing scalar that differs from the
/// incoming value becomes a list: existing value first, then the new
/// items. A scalar stays a scalar when the incoming items add nothing.
/// Equality is exact text.
pub fn merge_specs(running: &mut SpecMap, other: &SpecMap) {
    for (label, incoming) in other {
        let Some(current) = running.get_mut(label) else {
            running.insert(label.clone(), incoming.clone());
            continue;
        };

        match current {
            SpecValue::Multi(items) => append_missing(items, incoming.items()),
            SpecValue::Scalar(existing) => {
                if !matches!(incoming, SpecValue::Scalar(new) if *new == *existing) {
                    let mut items = vec![std::mem::take(existing)];
                    append_missing(&mut items, incoming.items());
                    // Nothing new arrived: keep the scalar.
                    *current = match items.len() {
                        1 => SpecValue::Scalar(items.remove(0)),
                        _ => SpecValue::Multi(items),
                    };
                }
            }
        }
    }
}

fn append_missing(items: &mut Vec<String>, incoming: &[String]) {
    for item in incoming {
        if !items.contains(item) {
            items.push(item.clone());
        }
    }
}

/// Build the canonical record for one primary record and its matches.
///
/// `matched` lists every secondary source in merge order with its matched
/// record, if any. `needs`, `features` and `image_links` come from the
/// primary record only.
pub fn merge_product(
    primary_id: &str,
    primary: &EnrichedRecord,
    matched: &[(&str, Option<&EnrichedRecord>)],
) -> MergedProduct {
    let p = &primary.record;

    let mut urls = IndexMap::new();
    let mut prices = IndexMap::new();
    urls.insert(primary_id.to_string(), p.url.clone());
    prices.insert(primary_id.to_string(), p.prices.clone());

    let mut specifications = p.specifications.clone();

    for (source, record) in matched {
        let Some(record) = record else {
            continue;
        };
        let r = &record.record;
        urls.insert(source.to_string(), r.url.clone());
        prices.insert(source.to_string(), r.prices.clone());
        merge_specs(&mut specifications, &r.specifications);
    }

    MergedProduct {
        name: p.name.clone(),
        display_name: p.display_name.clone(),
        category: p.category,
        brand: p.brand.clone(),
        urls,
        prices,
        specifications,
        needs: p.needs.clone(),
        features: p.features.clone(),
        image_links: p.image_links.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttributeProfile, Category, PriceEntry, RawProductRecord};

    fn specs(pairs: &[(&str, SpecValue)]) -> SpecMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn multi(items: &[&str]) -> SpecValue {
        SpecValue::Multi(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn differing_scalars_become_a_list() {
        let mut running = specs(&[("Màu sắc", "Đen".into())]);
        merge_specs(&mut running, &specs(&[("Màu sắc", "Trắng".into())]));
        assert_eq!(running["Màu sắc"], multi(&["Đen", "Trắng"]));
    }

    #[test]
    fn equal_scalars_stay_scalar() {
        let mut running = specs(&[("RAM", "8 GB".into())]);
        merge_specs(&mut running, &specs(&[("RAM", "8 GB".into())]));
        assert_eq!(running["RAM"], SpecValue::from("8 GB"));
    }

    #[test]
    fn scalar_meeting_its_own_one_item_list_stays_scalar() {
        let mut running = specs(&[("Màu sắc", "Đen".into())]);
        merge_specs(&mut running, &specs(&[("Màu sắc", multi(&["Đen"]))]));
        assert_eq!(running["Màu sắc"], SpecValue::from("Đen"));

        merge_specs(&mut running, &specs(&[("Màu sắc", multi(&[]))]));
        assert_eq!(running["Màu sắc"], SpecValue::from("Đen"));

        merge_specs(&mut running, &specs(&[("Màu sắc", multi(&["Đen", "Trắng"]))]));
        assert_eq!(running["Màu sắc"], multi(&["Đen", "Trắng"]));
    }

    #[test]
    fn equality_is_exact_text() {
        let mut running = specs(&[("RAM", "8 GB".into())]);
        merge_specs(&mut running, &specs(&[("RAM", "8GB".into())]));
        assert_eq!(running["RAM"], multi(&["8 GB", "8GB"]));
    }

    #[test]
    fn lists_gain_only_new_items() {
        let mut running = specs(&[("Màu sắc", multi(&["Đen", "Trắng"]))]);
        merge_specs(&mut running, &specs(&[("Màu sắc", "Trắng".into())]));
        merge_specs(&mut running, &specs(&[("Màu sắc", multi(&["Xanh", "Đen"]))]));
        assert_eq!(running["Màu sắc"], multi(&["Đen", "Trắng", "Xanh"]));
    }

    #[test]
    fn new_keys_are_appended_in_order() {
        let mut running = specs(&[("Chip", "A17".into())]);
        merge_specs(&mut running, &specs(&[("Pin", "4422 mAh".into()), ("Chip", "A17".into())]));
        let labels: Vec<&str> = running.keys().map(String::as_str).collect();
        assert_eq!(labels, vec!["Chip", "Pin"]);
    }

    fn enriched(url: &str, price: u64, spec: &[(&str, SpecValue)]) -> EnrichedRecord {
        let mut record = RawProductRecord::new("iphone 15 128gb", url, Category::Phone);
        record.brand = "apple".into();
        record.prices = vec![PriceEntry { color: "Đen".into(), price }];
        record.specifications = specs(spec);
        record.features = Some(vec![format!("feature from {url}")]);
        EnrichedRecord { record, profile: AttributeProfile::default() }
    }

    #[test]
    fn product_keeps_primary_only_fields_and_keys_sources() {
        let primary = enriched("https://cps/1", 100, &[("Chip", "A16".into())]);
        let tgdd = enriched("https://tgdd/1", 90, &[("Chip", "A16 Bionic".into())]);
        let product = merge_product(
            "cellphones",
            &primary,
            &[("fptshop", None), ("tgdd", Some(&tgdd))],
        );

        assert_eq!(product.urls.keys().collect::<Vec<_>>(), vec!["cellphones", "tgdd"]);
        assert_eq!(product.urls["tgdd"], "https://tgdd/1");
        assert_eq!(product.prices["tgdd"][0].price, 90);
        assert!(!product.prices.contains_key("fptshop"));
        assert_eq!(product.specifications["Chip"], multi(&["A16", "A16 Bionic"]));
        assert_eq!(product.features, Some(vec!["feature from https://cps/1".to_string()]));
        assert_eq!(product.brand, "apple");
    }
}
