use crate::brand::resolve_brand;
use crate::clean::{clean_features, clean_specs};
use crate::config::LinkConfig;
use crate::error::ReconError;
use crate::evidence::{category_summary, compute_summary, unmatched_records};
use crate::extract::extract_profile;
use crate::matcher::match_sources;
use crate::merge::merge_product;
use crate::model::{
    Category, CategoryResult, EnrichedRecord, LinkInput, LinkMeta, LinkResult, RawProductRecord,
};
use crate::normalize::normalize_name;
use crate::rules::rules_for;

/// Run the merge for every configured category, in config order.
pub fn run(config: &LinkConfig, input: &LinkInput) -> Result<LinkResult, ReconError> {
    let primary = input.records.get(&config.primary).ok_or_else(|| {
        ReconError::UnknownSource(format!("primary source '{}' has no data", config.primary))
    })?;

    let secondaries: Vec<(&str, &[RawProductRecord])> = config
        .secondaries
        .iter()
        .map(|id| match input.records.get(id) {
            Some(records) => (id.as_str(), records.as_slice()),
            None => {
                log::warn!("secondary source '{id}' has no data, treated as empty");
                (id.as_str(), &[][..])
            }
        })
        .collect();

    let mut categories = Vec::with_capacity(config.categories.len());
    for &category in &config.categories {
        let primary_part = partition(primary, category);
        let secondary_parts: Vec<(&str, Vec<RawProductRecord>)> = secondaries
            .iter()
            .map(|&(id, records)| (id, partition(records, category)))
            .collect();
        let secondary_refs: Vec<(&str, &[RawProductRecord])> = secondary_parts
            .iter()
            .map(|(id, records)| (*id, records.as_slice()))
            .collect();

        categories.push(reconcile_category(
            category,
            &config.primary,
            &primary_part,
            &secondary_refs,
        ));
    }

    let summary = compute_summary(&categories);
    log::info!(
        "{}: {} products across {} categories, {} matched, {} unmatched",
        config.name,
        summary.products,
        summary.categories,
        summary.matched,
        summary.unmatched
    );

    Ok(LinkResult {
        meta: LinkMeta {
            config_name: config.name.clone(),
            primary: config.primary.clone(),
            secondaries: config.secondaries.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        categories,
    })
}

/// Records of one category, in input order.
fn partition(records: &[RawProductRecord], category: Category) -> Vec<RawProductRecord> {
    records.iter().filter(|r| r.category == category).cloned().collect()
}

/// Enrich, match and merge one category. `secondaries` are in merge order.
///
/// Categories are independent; the greedy match inside one category is
/// order-sensitive, so record order must be the collectors' order.
pub fn reconcile_category(
    category: Category,
    primary_id: &str,
    primary: &[RawProductRecord],
    secondaries: &[(&str, &[RawProductRecord])],
) -> CategoryResult {
    let mut rejected = 0;
    let mut enrich_all = |records: &[RawProductRecord]| -> Vec<EnrichedRecord> {
        records
            .iter()
            .map(|r| {
                let (enriched, discarded) = enrich_record(r);
                rejected += discarded;
                enriched
            })
            .collect()
    };

    let primary = enrich_all(primary);
    let enriched: Vec<(&str, Vec<EnrichedRecord>)> = secondaries
        .iter()
        .map(|&(id, records)| (id, enrich_all(records)))
        .collect();
    let candidates: Vec<(&str, &[EnrichedRecord])> =
        enriched.iter().map(|(id, records)| (*id, records.as_slice())).collect();

    let matches = match_sources(&primary, &candidates);

    let products = primary
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let matched: Vec<(&str, Option<&EnrichedRecord>)> = matches
                .iter()
                .zip(&candidates)
                .map(|(m, &(id, records))| (id, m.matches[i].map(|c| &records[c.index])))
                .collect();
            merge_product(primary_id, p, &matched)
        })
        .collect::<Vec<_>>();

    let unmatched = matches
        .iter()
        .zip(&candidates)
        .flat_map(|(m, &(_, records))| unmatched_records(m, records))
        .collect::<Vec<_>>();

    let per_source: Vec<_> = matches
        .iter()
        .zip(&candidates)
        .map(|(m, &(_, records))| (m, records.len()))
        .collect();
    let summary = category_summary(primary.len(), products.len(), &per_source, rejected);

    for (source, stats) in &summary.sources {
        log::info!(
            "{category}: {source}: {} exact-name, {} attribute, {} of {} unmatched",
            stats.exact_name,
            stats.attributes,
            stats.unmatched,
            stats.records
        );
    }
    log::info!("{category}: {} merged products", products.len());

    CategoryResult { category, products, summary, unmatched }
}

/// Normalize the title, clean specs and features, resolve the brand and
/// extract the attribute profile. Also returns how many extracted sizes
/// were discarded.
pub fn enrich_record(raw: &RawProductRecord) -> (EnrichedRecord, usize) {
    let rules = rules_for(raw.category);
    let name = normalize_name(&raw.name);
    let specifications = clean_specs(&raw.specifications);
    let brand = resolve_brand(&raw.brand, &name.comparable, &specifications, rules);
    let extraction = extract_profile(&name.comparable, &brand, &specifications, rules);

    log::debug!(
        "enriched '{}' → brand {brand}, model '{}', ram {:?}, storage {:?}",
        name.comparable,
        extraction.profile.model,
        extraction.profile.ram_gb,
        extraction.profile.storage_gb
    );

    let record = RawProductRecord {
        name: name.comparable,
        display_name: name.display,
        url: raw.url.clone(),
        brand,
        specifications,
        prices: raw.prices.clone(),
        features: raw.features.as_deref().map(clean_features),
        needs: raw.needs.clone(),
        image_links: raw.image_links.clone(),
        category: raw.category,
    };

    (EnrichedRecord { record, profile: extraction.profile }, extraction.rejected)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::model::SpecValue;

    const CONFIG: &str = r#"
name = "Test merge"
primary = "cellphones"
secondaries = ["fptshop", "tgdd"]
categories = ["phone", "laptop"]

[sources.cellphones]
dir = "cps"
[sources.fptshop]
dir = "fpt"
[sources.tgdd]
dir = "tgdd"
"#;

    fn phone(name: &str, url: &str, specs: &[(&str, &str)]) -> RawProductRecord {
        let mut r = RawProductRecord::new(name, url, Category::Phone);
        r.specifications = specs.iter().map(|(k, v)| (k.to_string(), SpecValue::from(*v))).collect();
        r
    }

    #[test]
    fn enrich_sets_comparable_and_display_names() {
        let raw = phone(
            "Samsung Galaxy S23 256GB Chính hãng | Trả góp 0%",
            "https://cps/s23",
            &[("Dung lượng RAM", "8 GB"), ("Bộ nhớ trong", "256 GB")],
        );
        let (e, rejected) = enrich_record(&raw);
        assert_eq!(e.name(), "samsung galaxy s23 256gb");
        assert_eq!(e.record.display_name, "Samsung Galaxy S23 256GB");
        assert_eq!(e.brand(), "samsung");
        assert_eq!(e.profile.ram_gb, Some(8));
        assert_eq!(e.profile.storage_gb, Some(256));
        assert_eq!(rejected, 0);
    }

    #[test]
    fn enrich_counts_rejections() {
        let (e, rejected) = enrich_record(&phone("Oppo A18", "https://x/1", &[("RAM", "999 GB")]));
        assert_eq!(e.profile.ram_gb, None);
        assert_eq!(rejected, 1);
    }

    #[test]
    fn reconcile_merges_matches_and_reports_leftovers() {
        let cps = vec![
            phone("iPhone 15 128GB Chính hãng", "https://cps/ip15", &[("Màu sắc", "Đen")]),
            phone("Xiaomi Redmi Note 13 8GB 256GB", "https://cps/rn13", &[]),
        ];
        let fpt = vec![
            phone("Nokia 105 4G", "https://fpt/n105", &[]),
            phone("iPhone 15 128GB", "https://fpt/ip15", &[("Màu sắc", "Trắng")]),
        ];
        let tgdd = vec![phone("Điện thoại Xiaomi Redmi Note 13 8GB/256GB", "https://tgdd/rn13", &[])];

        let result = reconcile_category(
            Category::Phone,
            "cellphones",
            &cps,
            &[("fptshop", fpt.as_slice()), ("tgdd", tgdd.as_slice())],
        );

        assert_eq!(result.products.len(), 2);
        let ip = &result.products[0];
        assert_eq!(ip.urls.keys().collect::<Vec<_>>(), vec!["cellphones", "fptshop"]);
        assert_eq!(
            ip.specifications["Màu sắc"],
            SpecValue::Multi(vec!["Đen".into(), "Trắng".into()])
        );

        let rn = &result.products[1];
        assert_eq!(rn.urls.get("tgdd").map(String::as_str), Some("https://tgdd/rn13"));
        assert_eq!(rn.brand, "xiaomi");

        assert_eq!(result.summary.sources["fptshop"].exact_name, 1);
        assert_eq!(result.summary.sources["tgdd"].attributes, 1);
        assert_eq!(result.unmatched.len(), 1);
        assert_eq!(result.unmatched[0].url, "https://fpt/n105");
    }

    #[test]
    fn run_partitions_by_category_and_tolerates_missing_secondary() {
        let config = LinkConfig::from_toml(CONFIG).unwrap();
        let mut laptop = RawProductRecord::new("Laptop Dell Inspiron 15 3520", "https://cps/l1", Category::Laptop);
        laptop.brand = "Dell".into();
        let mut records = HashMap::new();
        records.insert(
            "cellphones".to_string(),
            vec![phone("Vivo Y17s 4GB 128GB", "https://cps/y17s", &[]), laptop],
        );
        records.insert(
            "fptshop".to_string(),
            vec![phone("Vivo Y17s 4GB 128GB", "https://fpt/y17s", &[])],
        );
        let result = run(&config, &LinkInput { records }).unwrap();

        assert_eq!(result.meta.config_name, "Test merge");
        assert_eq!(result.meta.engine_version, env!("CARGO_PKG_VERSION"));
        let cats: Vec<Category> = result.categories.iter().map(|c| c.category).collect();
        assert_eq!(cats, vec![Category::Phone, Category::Laptop]);
        assert_eq!(result.categories[0].products.len(), 1);
        assert_eq!(result.categories[1].products[0].brand, "dell");
        assert_eq!(result.summary.products, 2);
        assert_eq!(result.summary.matched, 1);
        assert_eq!(result.categories[0].summary.sources["tgdd"].records, 0);
    }

    #[test]
    fn run_requires_primary_data() {
        let config = LinkConfig::from_toml(CONFIG).unwrap();
        let err = run(&config, &LinkInput { records: HashMap::new() }).unwrap_err();
        assert!(matches!(err, ReconError::UnknownSource(_)));
    }

    #[test]
    fn exact_name_match_ignores_profile_differences() {
        let cps = vec![phone("Samsung Galaxy A15", "https://cps/a15", &[("RAM", "8 GB")])];
        let fpt = vec![phone("Samsung Galaxy A15", "https://fpt/a15", &[("RAM", "6 GB")])];
        let result = reconcile_category(Category::Phone, "cellphones", &cps, &[("fptshop", fpt.as_slice())]);
        assert_eq!(result.summary.sources["fptshop"].exact_name, 1);
        assert_eq!(
            result.products[0].specifications["RAM"],
            SpecValue::Multi(vec!["8 GB".into(), "6 GB".into()])
        );
    }
}
