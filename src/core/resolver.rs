use crate::core::pricing;
use crate::domain::model::{CatalogueEntry, PackageCode, ParsedLine, ResolvedOrder};
use crate::domain::ports::CatalogueService;
use crate::utils::error::Result;

const GENERAL_REGION: &str = "General";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub found: Vec<CatalogueEntry>,
    pub not_found: Vec<PackageCode>,
}

/// 將套餐代碼對應到目錄項目，每批只查詢一次目錄
pub struct CatalogueResolver<'a, C: CatalogueService + ?Sized> {
    catalogue: &'a C,
}

impl<'a, C: CatalogueService + ?Sized> CatalogueResolver<'a, C> {
    pub fn new(catalogue: &'a C) -> Self {
        Self { catalogue }
    }

    pub async fn resolve(&self, codes: &[PackageCode], game_name: &str) -> Result<Resolution> {
        let entries = self.catalogue.fetch_catalogue(game_name).await?;
        Ok(match_codes(codes, &entries))
    }

    /// 解析多行訂單；整批共用同一份目錄快照
    pub async fn resolve_lines(
        &self,
        lines: &[ParsedLine],
        game_name: &str,
    ) -> Result<Vec<ResolvedOrder>> {
        let entries = self.catalogue.fetch_catalogue(game_name).await?;
        tracing::debug!(
            "📦 Catalogue for {}: {} entries, resolving {} line(s)",
            game_name,
            entries.len(),
            lines.len()
        );

        Ok(lines
            .iter()
            .map(|parsed| {
                let Resolution { found, not_found } = match_codes(&parsed.codes, &entries);
                ResolvedOrder {
                    line: parsed.line.clone(),
                    total_cost: pricing::total_price(&found),
                    found_packages: found,
                    not_found_codes: not_found,
                }
            })
            .collect())
    }
}

/// 依請求順序比對 resell keyword（區分大小寫）
pub fn match_codes(codes: &[PackageCode], entries: &[CatalogueEntry]) -> Resolution {
    let mut resolution = Resolution::default();
    for code in codes {
        match entries.iter().find(|entry| entry.matches(code)) {
            Some(entry) => resolution.found.push(entry.clone()),
            None => resolution.not_found.push(code.clone()),
        }
    }
    resolution
}

/// 依地區分組，供目錄瀏覽使用。地區依目錄中首次出現的順序排列。
pub fn group_by_region(entries: &[CatalogueEntry]) -> Vec<(String, Vec<CatalogueEntry>)> {
    let mut groups: Vec<(String, Vec<CatalogueEntry>)> = Vec::new();
    for entry in entries {
        let region = if entry.region.trim().is_empty() {
            GENERAL_REGION
        } else {
            entry.region.as_str()
        };
        match groups.iter_mut().find(|(name, _)| name == region) {
            Some((_, packages)) => packages.push(entry.clone()),
            None => groups.push((region.to_string(), vec![entry.clone()])),
        }
    }
    groups
}
