//! Tabular ingestion parser for wholesale catalog exports.
//!
//! Input is raw delimited text (the caller owns file I/O): a header row
//! followed by item rows, with category headers marked by a `****` sentinel
//! in the name column. Output is a normalized record set plus import
//! statistics. Parsing is strictly sequential because header rows change the
//! category context for every row that follows positionally.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

use crate::errors::ServiceError;
use crate::models::{CatalogRecord, ImportStats, ParsedPrice};

/// A row whose resolved name contains this substring is a category header.
pub const CATEGORY_SENTINEL: &str = "****";

/// Column name candidates per logical field, matched case-sensitively,
/// first present non-empty value wins.
const NAME_COLUMNS: &[&str] = &["Common Name", "Name", "Item Name", "Item Number"];
const QUANTITY_COLUMNS: &[&str] = &["QtyOH", "Qty", "Quantity", "Stock"];
const COST_COLUMNS: &[&str] = &["Cost", "Price", "Wholesale"];
const SELL_COLUMNS: &[&str] = &["Sell", "Retail", "Sale Price"];

// Trailing lot annotations: a parenthetical mentioning lot/quantity language,
// or a bare `<digits> [+] LOT|PC|PCS` tail.
static LOT_PAREN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\([^)]*(?:LOT|PCS|PC|\+)[^)]*\)\s*$").unwrap());
static LOT_BARE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b\d+\s*\+?\s*(?:LOT|PCS|PC)\s*$").unwrap());

/// Parser output: the record set and the counters shown to the admin.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub records: Vec<CatalogRecord>,
    pub stats: ImportStats,
}

/// Rejects files the parser should not even attempt to read.
pub fn ensure_supported_extension(file_name: &str) -> Result<(), ServiceError> {
    let supported = file_name
        .rsplit('.')
        .next()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if supported && file_name.len() > 4 {
        Ok(())
    } else {
        Err(ServiceError::UnsupportedFileType(file_name.to_string()))
    }
}

/// Parses raw catalog text into a normalized record set.
///
/// Fails with [`ServiceError::NoValidData`] when zero item records were
/// produced; callers gate destructive catalog replacement on a successful,
/// non-empty parse.
pub fn parse_catalog(text: &str) -> Result<ParseOutcome, ServiceError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    if text.trim().is_empty() {
        return Err(ServiceError::EmptyFile);
    }

    // Strict field counts: a ragged row is malformed structure, not a
    // per-field content problem.
    let mut reader = csv::ReaderBuilder::new().from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    let mut stats = ImportStats::default();
    let mut current_category: Option<String> = None;
    let mut next_unique_id: u64 = 1;

    for row in reader.records() {
        let row = row?;
        stats.total_rows += 1;

        let raw_name = match resolve_field(&headers, &row, NAME_COLUMNS) {
            Some(name) => name.to_string(),
            None => continue,
        };

        if raw_name.contains(CATEGORY_SENTINEL) {
            let stripped = raw_name.replace(CATEGORY_SENTINEL, "");
            let trimmed = stripped.trim_matches(|c: char| c == '*' || c.is_whitespace());
            let category = clean_item_name(trimmed);
            if category.is_empty() {
                // An empty header is not emitted but still resets the carry.
                current_category = None;
                continue;
            }
            let header =
                CatalogRecord::header(next_unique_id, raw_name.clone(), category.clone());
            next_unique_id += 1;
            current_category = Some(category);
            records.push(header);
            stats.categories += 1;
            stats.valid_rows += 1;
            continue;
        }

        let cleaned = clean_item_name(&raw_name);
        if cleaned.is_empty() {
            continue;
        }

        let mut record =
            CatalogRecord::item(next_unique_id, raw_name, derive_search_key(&cleaned));
        next_unique_id += 1;
        record.category = current_category.clone();
        record.quantity_on_hand = parse_quantity(resolve_field(&headers, &row, QUANTITY_COLUMNS));
        record.cost_basis = parse_price(resolve_field(&headers, &row, COST_COLUMNS));
        record.sale_price = parse_price(resolve_field(&headers, &row, SELL_COLUMNS));

        records.push(record);
        stats.items += 1;
        stats.valid_rows += 1;
    }

    if stats.items == 0 {
        return Err(ServiceError::NoValidData);
    }

    Ok(ParseOutcome { records, stats })
}

/// Resolves a logical field through an ordered candidate list, returning the
/// first present non-empty cell.
fn resolve_field<'a>(
    headers: &[String],
    row: &'a csv::StringRecord,
    candidates: &[&str],
) -> Option<&'a str> {
    for candidate in candidates {
        if let Some(idx) = headers.iter().position(|h| h == candidate) {
            if let Some(value) = row.get(idx) {
                let value = value.trim();
                if !value.is_empty() {
                    return Some(value);
                }
            }
        }
    }
    None
}

/// Cleans an item name for category-carry and search-key purposes. The
/// display name is never altered; `raw_name` keeps the original.
///
/// Deliberately coarser than the size-aware split in
/// [`super::normalize`]: everything after the first hyphen is dropped here.
/// The two mechanisms coexist on purpose; see DESIGN.md.
pub fn clean_item_name(raw: &str) -> String {
    let without_paren = LOT_PAREN_RE.replace(raw, "");
    let without_lot = LOT_BARE_RE.replace(&without_paren, "");

    let mut name = without_lot.into_owned();
    if let Some(idx) = name.find('-') {
        name.truncate(idx);
    }

    collapse_whitespace(&name)
}

/// Canonical correlation key: uppercase, keep only word characters, spaces,
/// and hyphens, trim. Stored images are associated by this key, not by
/// unstable row identity.
pub fn derive_search_key(cleaned: &str) -> String {
    cleaned
        .to_uppercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == ' ' || *c == '-')
        .collect::<String>()
        .trim()
        .to_string()
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Quantity-on-hand defaults to 0 on absence or parse failure and is
/// clamped to 0 for negative inputs; there is no negative-domain meaning
/// for stock counts.
fn parse_quantity(raw: Option<&str>) -> u32 {
    let Some(raw) = raw else { return 0 };
    match raw.trim().parse::<i64>() {
        Ok(qty) if qty < 0 => {
            debug!(quantity = qty, "negative quantity clamped to 0");
            0
        }
        Ok(qty) => u32::try_from(qty).unwrap_or(u32::MAX),
        Err(_) => 0,
    }
}

/// Price cells may carry currency symbols and grouping characters; strip
/// everything that is not a digit, dot, or minus before parsing. Failure
/// yields "no price", never zero.
fn parse_price(raw: Option<&str>) -> Option<ParsedPrice> {
    let raw = raw?;
    let numeric: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if numeric.is_empty() {
        return None;
    }
    Decimal::from_str(&numeric).ok().map(ParsedPrice::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn parse(text: &str) -> ParseOutcome {
        parse_catalog(text).expect("parse should succeed")
    }

    #[test]
    fn category_carry_follows_row_order() {
        let outcome = parse(
            "Common Name,QtyOH\n\
             ****ANGELS****,\n\
             FLAME ANGEL,3\n\
             CORAL BEAUTY,2\n\
             ****TANGS****,\n\
             BLUE TANG,5\n",
        );

        let items: Vec<_> = outcome.records.iter().filter(|r| !r.is_category).collect();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].category.as_deref(), Some("ANGELS"));
        assert_eq!(items[1].category.as_deref(), Some("ANGELS"));
        assert_eq!(items[2].category.as_deref(), Some("TANGS"));
        assert_eq!(outcome.stats.categories, 2);
        assert_eq!(outcome.stats.items, 3);
        assert_eq!(outcome.stats.valid_rows, 5);
        assert_eq!(outcome.stats.total_rows, 5);
    }

    #[test]
    fn empty_header_resets_category_without_emitting() {
        let outcome = parse(
            "Common Name\n\
             ****ANGELS****\n\
             FLAME ANGEL\n\
             ********\n\
             BLUE TANG\n",
        );

        let tang = outcome
            .records
            .iter()
            .find(|r| r.raw_name == "BLUE TANG")
            .unwrap();
        assert_eq!(tang.category, None);
        assert_eq!(outcome.stats.categories, 1);
    }

    #[test]
    fn lot_suffixes_clean_to_same_name() {
        for raw in ["BLUE TANG (3+ LOT)", "BLUE TANG 3+ LOT", "BLUE TANG-LOT"] {
            assert_eq!(clean_item_name(raw), "BLUE TANG", "input: {raw}");
        }
    }

    #[test]
    fn lot_parenthetical_variants() {
        assert_eq!(clean_item_name("CHROMIS (10 PCS)"), "CHROMIS");
        assert_eq!(clean_item_name("CHROMIS (5 PC)"), "CHROMIS");
        assert_eq!(clean_item_name("HERMIT CRAB 25PCS"), "HERMIT CRAB");
        // Lot language must be anchored at the end.
        assert_eq!(
            clean_item_name("LOTUS CORAL FRAG"),
            "LOTUS CORAL FRAG"
        );
    }

    #[test]
    fn first_hyphen_cut_is_coarse() {
        assert_eq!(clean_item_name("CLOWN TANG-SM"), "CLOWN TANG");
        assert_eq!(clean_item_name("CLOWN TANG-LG"), "CLOWN TANG");
        // Everything after the first hyphen goes, even mid-name hyphens.
        assert_eq!(clean_item_name("BLUE-SPOT JAWFISH-MD"), "BLUE");
    }

    #[test]
    fn search_key_is_deterministic_and_strips_punctuation() {
        let a = derive_search_key(&clean_item_name("Clown Tang-SM"));
        let b = derive_search_key(&clean_item_name("CLOWN TANG-LG"));
        assert_eq!(a, "CLOWN TANG");
        assert_eq!(a, b);
        assert_eq!(
            derive_search_key("BANGGAI CARDINAL!"),
            "BANGGAI CARDINAL"
        );
        // Pure function: repeated calls agree.
        assert_eq!(
            derive_search_key("BANGGAI CARDINAL!"),
            derive_search_key("BANGGAI CARDINAL!")
        );
    }

    #[test]
    fn name_resolves_through_candidate_order() {
        let outcome = parse(
            "Item Name,Common Name,QtyOH\n\
             fallback,PREFERRED NAME,1\n\
             only item name,,1\n",
        );
        assert_eq!(outcome.records[0].raw_name, "PREFERRED NAME");
        assert_eq!(outcome.records[1].raw_name, "only item name");
    }

    #[test]
    fn rows_without_resolvable_name_are_skipped() {
        let outcome = parse(
            "Common Name,QtyOH\n\
             ,4\n\
             FLAME ANGEL,3\n",
        );
        assert_eq!(outcome.stats.total_rows, 2);
        assert_eq!(outcome.stats.valid_rows, 1);
        assert_eq!(outcome.stats.items, 1);
    }

    #[test]
    fn quantity_defaults_and_clamps() {
        let outcome = parse(
            "Common Name,QtyOH\n\
             A FISH,not a number\n\
             B FISH,-4\n\
             C FISH,12\n\
             D FISH,\n",
        );
        let quantities: Vec<u32> = outcome
            .records
            .iter()
            .map(|r| r.quantity_on_hand)
            .collect();
        assert_eq!(quantities, vec![0, 0, 12, 0]);
    }

    #[test]
    fn price_failure_degrades_to_absent_not_zero() {
        let outcome = parse(
            "Common Name,Cost,Sell\n\
             A FISH,$12.50,\"$19.99\"\n\
             B FISH,call for price,\n",
        );
        let a = &outcome.records[0];
        assert_eq!(a.cost_basis.as_ref().unwrap().amount, dec!(12.50));
        assert_eq!(a.cost_basis.as_ref().unwrap().display, "$12.50");
        assert_eq!(a.sale_price.as_ref().unwrap().amount, dec!(19.99));

        let b = &outcome.records[1];
        assert!(b.cost_basis.is_none());
        assert!(b.sale_price.is_none());
        // The row itself survives its bad numeric fields.
        assert_eq!(outcome.stats.items, 2);
    }

    #[test]
    fn cost_resolves_in_preference_order() {
        let outcome = parse(
            "Common Name,Wholesale,Cost\n\
             A FISH,5.00,7.25\n",
        );
        assert_eq!(
            outcome.records[0].cost_basis.as_ref().unwrap().amount,
            dec!(7.25)
        );
    }

    #[test]
    fn bom_is_stripped_before_parsing() {
        let outcome = parse("\u{feff}Common Name,QtyOH\nFLAME ANGEL,3\n");
        assert_eq!(outcome.records[0].raw_name, "FLAME ANGEL");
    }

    #[test]
    fn header_only_file_is_no_valid_data() {
        assert_matches::assert_matches!(
            parse_catalog("Common Name,QtyOH\n"),
            Err(ServiceError::NoValidData)
        );
    }

    #[test]
    fn category_only_file_is_no_valid_data() {
        assert_matches::assert_matches!(
            parse_catalog("Common Name\n****ANGELS****\n"),
            Err(ServiceError::NoValidData)
        );
    }

    #[test]
    fn empty_file_is_distinct_error() {
        assert_matches::assert_matches!(parse_catalog(""), Err(ServiceError::EmptyFile));
        assert_matches::assert_matches!(
            parse_catalog("\u{feff}  \n"),
            Err(ServiceError::EmptyFile)
        );
    }

    #[test]
    fn malformed_csv_surfaces_parse_error() {
        // Ragged row: three fields under a two-column header.
        let result = parse_catalog("Common Name,Cost\nFLAME ANGEL,3,EXTRA\n");
        assert_matches::assert_matches!(result, Err(ServiceError::MalformedFile(_)));
    }

    #[test]
    fn extension_gate_rejects_non_csv() {
        assert!(ensure_supported_extension("catalog.csv").is_ok());
        assert!(ensure_supported_extension("CATALOG.CSV").is_ok());
        assert_matches::assert_matches!(
            ensure_supported_extension("catalog.xlsx"),
            Err(ServiceError::UnsupportedFileType(_))
        );
        assert_matches::assert_matches!(
            ensure_supported_extension("csv"),
            Err(ServiceError::UnsupportedFileType(_))
        );
    }

    #[test]
    fn unique_ids_are_never_duplicated_within_a_load() {
        let outcome = parse(
            "Common Name\n\
             ****ANGELS****\n\
             FLAME ANGEL\n\
             CORAL BEAUTY\n",
        );
        let mut ids: Vec<u64> = outcome.records.iter().map(|r| r.unique_id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), outcome.records.len());
    }

    #[test]
    fn header_category_name_is_cleaned() {
        let outcome = parse(
            "Common Name\n\
             **** ANGELS - PREMIUM ****\n\
             FLAME ANGEL\n",
        );
        let header = outcome.records.iter().find(|r| r.is_category).unwrap();
        assert_eq!(header.category.as_deref(), Some("ANGELS"));
    }
}
