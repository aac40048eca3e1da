//! Raw tabular input and column resolution.
//!
//! The loader hands over each sheet as a header row plus string cells. Columns
//! are found by name, case-insensitively, under any of their accepted aliases.

use super::record::{CommuneRecord, HamletRecord, SheetKind};
use crate::error::SchemaError;

/// A required column and the header spellings accepted for it.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
}

impl ColumnSpec {
    fn matches(&self, header: &str) -> bool {
        let header = header.trim();
        header.eq_ignore_ascii_case(self.name)
            || self.aliases.iter().any(|alias| header.eq_ignore_ascii_case(alias))
    }
}

const OLD_HAMLET: ColumnSpec = ColumnSpec {
    name: "oldHamlet",
    aliases: &["old_hamlet", "apcu"],
};
const OLD_COMMUNE: ColumnSpec = ColumnSpec {
    name: "oldCommune",
    aliases: &["old_commune", "xacu"],
};
const OLD_DISTRICT: ColumnSpec = ColumnSpec {
    name: "oldDistrict",
    aliases: &["old_district", "huyencu"],
};
const OLD_PROVINCE: ColumnSpec = ColumnSpec {
    name: "oldProvince",
    aliases: &["old_province", "tinhcu"],
};
const NEW_HAMLET: ColumnSpec = ColumnSpec {
    name: "newHamlet",
    aliases: &["new_hamlet", "apmoi"],
};
const NEW_COMMUNE: ColumnSpec = ColumnSpec {
    name: "newCommune",
    aliases: &["new_commune", "xamoi"],
};
const NEW_PROVINCE: ColumnSpec = ColumnSpec {
    name: "newProvince",
    aliases: &["new_province", "tinhmoi"],
};

/// Columns of the commune sheet, in record field order.
pub const COMMUNE_COLUMNS: [ColumnSpec; 5] =
    [OLD_COMMUNE, OLD_DISTRICT, OLD_PROVINCE, NEW_COMMUNE, NEW_PROVINCE];

/// Columns of the hamlet sheet, in record field order.
pub const HAMLET_COLUMNS: [ColumnSpec; 7] = [
    OLD_HAMLET,
    OLD_COMMUNE,
    OLD_DISTRICT,
    OLD_PROVINCE,
    NEW_HAMLET,
    NEW_COMMUNE,
    NEW_PROVINCE,
];

/// One sheet as delivered by the loader.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Build a table from string literals, mostly for fixtures.
    pub fn from_slices(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of each listed column, or every column that could not be found.
    pub fn locate<const N: usize>(
        &self,
        sheet: SheetKind,
        columns: &[ColumnSpec; N],
    ) -> Result<[usize; N], SchemaError> {
        let mut positions = [0usize; N];
        let mut missing = Vec::new();

        for (slot, column) in positions.iter_mut().zip(columns) {
            match self.headers.iter().position(|h| column.matches(h)) {
                Some(pos) => *slot = pos,
                None => missing.push(column.name),
            }
        }

        if missing.is_empty() {
            Ok(positions)
        } else {
            Err(SchemaError::MissingColumns { sheet, missing })
        }
    }

    fn project<const N: usize>(&self, positions: [usize; N]) -> impl Iterator<Item = [&str; N]> + '_ {
        self.rows.iter().map(move |row| {
            // short rows read as empty cells
            positions.map(|pos| row.get(pos).map_or("", |cell| cell.trim()))
        })
    }

    /// Read the table as commune records.
    pub fn commune_records(&self) -> Result<Vec<CommuneRecord>, SchemaError> {
        let positions = self.locate(SheetKind::Commune, &COMMUNE_COLUMNS)?;
        Ok(self
            .project(positions)
            .map(|[oc, od, op, nc, np]| CommuneRecord::new(oc, od, op, nc, np))
            .collect())
    }

    /// Read the table as hamlet records.
    pub fn hamlet_records(&self) -> Result<Vec<HamletRecord>, SchemaError> {
        let positions = self.locate(SheetKind::Hamlet, &HAMLET_COLUMNS)?;
        Ok(self
            .project(positions)
            .map(|[oh, oc, od, op, nh, nc, np]| HamletRecord::new(oh, oc, od, op, nh, nc, np))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commune_records_by_alias() {
        let table = RawTable::from_slices(
            &["TinhCu", "xacu", "huyencu", "extra", "XaMoi", "tinhmoi"],
            &[&["Long An", "An Phú", "Cần Giuộc", "x", "An Phú", "Tây Ninh"]],
        );
        let records = table.commune_records().unwrap();
        assert_eq!(
            records,
            vec![CommuneRecord::new("An Phú", "Cần Giuộc", "Long An", "An Phú", "Tây Ninh")]
        );
    }

    #[test]
    fn test_hamlet_records_canonical_names() {
        let table = RawTable::from_slices(
            &[
                "oldHamlet",
                "oldCommune",
                "oldDistrict",
                "oldProvince",
                "newHamlet",
                "newCommune",
                "newProvince",
            ],
            &[&["KP 2", "Long Thới", "Nhà Bè", "HCM", "KP 2", "Nhà Bè", "HCM"]],
        );
        let records = table.hamlet_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].old_hamlet, "KP 2");
        assert_eq!(records[0].new_commune, "Nhà Bè");
    }

    #[test]
    fn test_short_rows_read_as_empty() {
        let table = RawTable::from_slices(
            &["old_commune", "old_district", "old_province", "new_commune", "new_province"],
            &[&["  An Phú ", "Củ Chi"]],
        );
        let records = table.commune_records().unwrap();
        assert_eq!(records[0].old_commune, "An Phú");
        assert_eq!(records[0].old_province, "");
        assert_eq!(records[0].new_province, "");
    }

    #[test]
    fn test_missing_columns_are_all_reported() {
        let table = RawTable::from_slices(&["xacu", "huyencu", "tinhcu"], &[]);
        let err = table.commune_records().unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingColumns {
                sheet: SheetKind::Commune,
                missing: vec!["newCommune", "newProvince"],
            }
        );
    }

    #[test]
    fn test_hamlet_sheet_without_hamlet_columns() {
        let table = RawTable::from_slices(&["xacu", "huyencu", "tinhcu", "xamoi", "tinhmoi"], &[]);
        let err = table.hamlet_records().unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingColumns {
                sheet: SheetKind::Hamlet,
                missing: vec!["oldHamlet", "newHamlet"],
            }
        );
    }
}
