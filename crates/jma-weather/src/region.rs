//! Region index: centers with the offices that report to them.

use crate::types::{AreaDocument, Office, Region, RegionIndex};

/// Build the region → offices index from an area document.
///
/// Regions follow the document's center order. Each office is appended to
/// the region named by its `parent`, in document order. Offices whose parent
/// is absent or not a known center are left out of the index; this is
/// filtering, not an error.
pub fn build_region_index(doc: &AreaDocument) -> RegionIndex {
    let mut index = RegionIndex::from_regions(
        doc.centers
            .iter()
            .map(|(code, center)| Region {
                code: code.clone(),
                name: center.name.clone(),
                offices: Vec::new(),
            })
            .collect(),
    );

    let mut skipped = 0usize;
    for (code, office) in &doc.offices {
        let region = office
            .parent
            .as_deref()
            .and_then(|parent| index.get_mut(parent));

        match region {
            Some(region) => region.offices.push(Office {
                code: code.clone(),
                name: office.name.clone(),
            }),
            None => {
                tracing::debug!(
                    office = %code,
                    parent = ?office.parent,
                    "Skipping office without a known region"
                );
                skipped += 1;
            }
        }
    }

    tracing::info!(
        regions = index.len(),
        offices = index.office_count(),
        skipped,
        "Built region index"
    );
    index
}
