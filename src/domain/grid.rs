// ==========================================
// 成本分解表校验 - 表格网格模型 (GridAccessor)
// ==========================================
// 职责: 单 sheet 二维网格 + 工作簿(命名 sheet 序列)
// 红线: 网格解析后只读，任何校验组件不得修改
//       越界读取返回空单元格，不报错
// ==========================================

use crate::domain::cell::Cell;
use serde::{Deserialize, Serialize};
use std::fmt;

static EMPTY_CELL: Cell = Cell::Empty;

// ==========================================
// Grid - 单个 sheet 的二维网格
// ==========================================
// 索引: [row][col]，均为 0 基
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// 读取单元格，越界返回空单元格
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// 按 A1 地址读取
    pub fn cell_at(&self, address: CellAddress) -> &Cell {
        self.cell(address.row, address.col)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// 最宽行的列数
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| r.iter().all(Cell::is_empty))
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

// ==========================================
// Sheet / Workbook - 命名 sheet 序列
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub grid: Grid,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    /// 单 sheet 工作簿（CSV 上传、测试）
    pub fn single(name: impl Into<String>, grid: Grid) -> Self {
        Self {
            sheets: vec![Sheet {
                name: name.into(),
                grid,
            }],
        }
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn first(&self) -> Option<&Sheet> {
        self.sheets.first()
    }

    pub fn last(&self) -> Option<&Sheet> {
        self.sheets.last()
    }

    /// 按名称查找 sheet（忽略大小写与首尾空白）
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        let wanted = name.trim().to_lowercase();
        self.sheets
            .iter()
            .find(|s| s.name.trim().to_lowercase() == wanted)
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

// ==========================================
// 列字母 ↔ 列索引（双射 base-26）
// ==========================================

/// "A" → 0, "Z" → 25, "AA" → 26 ...
///
/// 非字母或空串返回 None
pub fn column_letter_to_index(letters: &str) -> Option<usize> {
    let letters = letters.trim();
    if letters.is_empty() {
        return None;
    }

    let mut acc: usize = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = (ch.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        acc = acc.checked_mul(26)?.checked_add(digit)?;
    }
    Some(acc - 1)
}

/// 0 → "A", 25 → "Z", 26 → "AA" ...
pub fn index_to_column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

// ==========================================
// ColumnRef - 规则表中的列引用（序列化为字母）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColumnRef(usize);

impl ColumnRef {
    pub fn index(self) -> usize {
        self.0
    }

    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// 由列字母构造；非法字母返回 None
    pub fn parse(letters: &str) -> Option<Self> {
        column_letter_to_index(letters).map(Self)
    }

    pub fn letters(self) -> String {
        index_to_column_letter(self.0)
    }
}

impl TryFrom<String> for ColumnRef {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ColumnRef::parse(&value).ok_or_else(|| format!("非法列字母: {:?}", value))
    }
}

impl From<ColumnRef> for String {
    fn from(value: ColumnRef) -> Self {
        value.letters()
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.letters())
    }
}

// ==========================================
// CellAddress - A1 地址（内部 0 基）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellAddress {
    pub row: usize,
    pub col: usize,
}

impl CellAddress {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// 解析 A1 记法（"E7" → row 6, col 4），允许 "$E$7"
    pub fn parse(input: &str) -> Option<Self> {
        let cleaned: String = input
            .trim()
            .chars()
            .filter(|c| *c != '$')
            .collect();
        let split = cleaned.find(|c: char| c.is_ascii_digit())?;
        let (letters, digits) = cleaned.split_at(split);
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let col = column_letter_to_index(letters)?;
        let row_num: usize = digits.parse().ok()?;
        if row_num == 0 {
            return None;
        }
        Some(Self {
            row: row_num - 1,
            col,
        })
    }

    /// 展示用地址（"Q14"，行号 1 基）
    pub fn to_a1(self) -> String {
        format!("{}{}", index_to_column_letter(self.col), self.row + 1)
    }
}

impl TryFrom<String> for CellAddress {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CellAddress::parse(&value).ok_or_else(|| format!("非法单元格地址: {:?}", value))
    }
}

impl From<CellAddress> for String {
    fn from(value: CellAddress) -> Self {
        value.to_a1()
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_round_trip_a_to_zz() {
        for i in 0..=701 {
            let letters = index_to_column_letter(i);
            assert_eq!(column_letter_to_index(&letters), Some(i), "列 {}", letters);
        }
        assert_eq!(index_to_column_letter(701), "ZZ");
    }

    #[test]
    fn test_column_letter_known_values() {
        assert_eq!(column_letter_to_index("A"), Some(0));
        assert_eq!(column_letter_to_index("z"), Some(25));
        assert_eq!(column_letter_to_index("AA"), Some(26));
        assert_eq!(column_letter_to_index("Q"), Some(16));
        assert_eq!(column_letter_to_index(""), None);
        assert_eq!(column_letter_to_index("A1"), None);
    }

    #[test]
    fn test_out_of_bounds_is_empty() {
        let grid = Grid::new(vec![vec![Cell::from("x")]]);
        assert_eq!(grid.cell(0, 0), &Cell::from("x"));
        assert_eq!(grid.cell(0, 5), &Cell::Empty);
        assert_eq!(grid.cell(100, 0), &Cell::Empty);
    }

    #[test]
    fn test_cell_address_parse() {
        let addr = CellAddress::parse("E7").unwrap();
        assert_eq!((addr.row, addr.col), (6, 4));
        assert_eq!(addr.to_a1(), "E7");
        assert_eq!(CellAddress::parse("$AA$10").unwrap().to_a1(), "AA10");
        assert!(CellAddress::parse("E0").is_none());
        assert!(CellAddress::parse("7E").is_none());
        assert!(CellAddress::parse("E").is_none());
    }

    #[test]
    fn test_column_ref_serde_as_letters() {
        let col: ColumnRef = serde_json::from_str("\"Q\"").unwrap();
        assert_eq!(col.index(), 16);
        assert_eq!(serde_json::to_string(&col).unwrap(), "\"Q\"");
        assert!(serde_json::from_str::<ColumnRef>("\"1\"").is_err());
    }

    #[test]
    fn test_workbook_sheet_lookup() {
        let wb = Workbook::new(vec![
            Sheet {
                name: "Summary".to_string(),
                grid: Grid::default(),
            },
            Sheet {
                name: "BCBD".to_string(),
                grid: Grid::default(),
            },
        ]);
        assert_eq!(wb.sheet(" bcbd ").map(|s| s.name.as_str()), Some("BCBD"));
        assert_eq!(wb.sheet_names(), vec!["Summary", "BCBD"]);
        assert_eq!(wb.last().map(|s| s.name.as_str()), Some("BCBD"));
    }
}
