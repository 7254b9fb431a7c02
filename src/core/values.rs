//! # Value Algebra Module / 值代数模块
//!
//! This module defines the typed cells passed to test cases and the `Values`
//! algebra used to build their argument rows. A `Values` is an immutable,
//! lazily iterated tree: literal columns at the leaves and the `multiply`,
//! `pseudo_multiply` and `intersect` operators at the inner nodes.
//!
//! 此模块定义传递给测试用例的类型化单元格，以及用于构建参数行的 `Values` 代数。
//! `Values` 是一棵不可变、惰性迭代的树：叶子是字面量列，
//! 内部节点是 `multiply`、`pseudo_multiply` 和 `intersect` 运算符。
//!
//! ## Row order / 行顺序
//!
//! ```text
//! multiply([1, 2], [a, b])        -> (1,a) (1,b) (2,a) (2,b)
//! pseudo_multiply([1, 2, 3], [a]) -> (1,a) (2,a) (3,a)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::core::error::HarnessError;
use crate::core::exclusion::ExcludedIndices;

/// The declared shape of a test case parameter.
/// 测试用例参数的声明类型。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    /// Accepts any value.
    Any,
    Bool,
    Char,
    Int,
    Float,
    Str,
    /// An array whose elements have the given type.
    Array(Box<ParamType>),
}

impl ParamType {
    pub fn array_of(element: ParamType) -> Self {
        ParamType::Array(Box::new(element))
    }

    /// Checks whether `value` can be passed for a parameter of this type.
    /// 检查 `value` 是否可以传递给此类型的参数。
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (ParamType::Any, _) => true,
            (ParamType::Bool, Value::Bool(_)) => true,
            (ParamType::Char, Value::Char(_)) => true,
            (ParamType::Int, Value::Int(_)) => true,
            (ParamType::Float, Value::Float(_)) => true,
            (ParamType::Str, Value::Str(_)) => true,
            (ParamType::Array(expected), Value::Array { element, .. }) => {
                **expected == ParamType::Any || **expected == *element
            }
            _ => false,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Any => write!(f, "any"),
            ParamType::Bool => write!(f, "bool"),
            ParamType::Char => write!(f, "char"),
            ParamType::Int => write!(f, "int"),
            ParamType::Float => write!(f, "float"),
            ParamType::Str => write!(f, "str"),
            ParamType::Array(element) => write!(f, "[{}]", element),
        }
    }
}

/// A single typed cell of a row, and the return value of a test case.
/// `Unit` is what a test case returns when it has nothing to report.
///
/// 数据行中的单个类型化单元格，也是测试用例的返回值。
/// 当测试用例没有需要报告的内容时返回 `Unit`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Unit,
    Bool(bool),
    Char(char),
    Int(i64),
    Float(f64),
    Str(String),
    Array { element: ParamType, items: Vec<Value> },
}

impl Value {
    pub fn array(element: ParamType, items: Vec<Value>) -> Self {
        Value::Array { element, items }
    }

    /// Returns the most specific parameter type this value conforms to.
    pub fn param_type(&self) -> ParamType {
        match self {
            Value::Unit => ParamType::Any,
            Value::Bool(_) => ParamType::Bool,
            Value::Char(_) => ParamType::Char,
            Value::Int(_) => ParamType::Int,
            Value::Float(_) => ParamType::Float,
            Value::Str(_) => ParamType::Str,
            Value::Array { element, .. } => ParamType::array_of(element.clone()),
        }
    }

    /// Converts this value into an element of `target` for array packing.
    /// Integers widen to floats and one-character strings narrow to chars;
    /// every other pairing must already conform.
    ///
    /// 将此值转换为 `target` 类型的数组元素。
    /// 整数可拓宽为浮点数，单字符字符串可收窄为字符；其他组合必须已经匹配。
    pub fn coerce_to(&self, target: &ParamType) -> Option<Value> {
        match (target, self) {
            (ParamType::Float, Value::Int(i)) => Some(Value::Float(*i as f64)),
            (ParamType::Char, Value::Str(s)) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Value::Char(c)),
                    _ => None,
                }
            }
            _ if target.accepts(self) => Some(self.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Char(c) => write!(f, "'{}'", c),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Array { items, .. } => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Char(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

/// Renders a row as `a, b, c` for diagnostics.
pub fn render_row(row: &[Value]) -> String {
    row.iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One argument tuple.
pub type Row = Vec<Value>;

/// How sibling columns are combined into rows.
/// 同级列组合成数据行的方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combination {
    /// Cartesian product, left operand varying slowest.
    Multiply,
    /// Positional zip with modulo wraparound.
    PseudoMultiply,
    /// Rows present in both operands.
    Intersect,
}

impl Combination {
    pub fn combine(self, left: &Values, right: &Values) -> Values {
        match self {
            Combination::Multiply => left.multiply(right),
            Combination::PseudoMultiply => left.pseudo_multiply(right),
            Combination::Intersect => left.intersect(right),
        }
    }
}

#[derive(Debug)]
enum Node {
    Literal { width: usize, rows: Arc<Vec<Row>> },
    Product(Values, Values),
    Zip(Values, Values),
    Intersection(Values, Values),
}

/// An ordered, finite collection of equally wide rows.
///
/// Cloning is cheap: operands are shared, never copied. Operators never
/// mutate their inputs.
///
/// 一个有序、有限、行宽一致的数据行集合。
/// 克隆开销很小：操作数是共享的，不会被复制。运算符从不修改其输入。
#[derive(Debug, Clone)]
pub struct Values {
    node: Arc<Node>,
    not_applicable: Option<Arc<ExcludedIndices>>,
}

impl Values {
    fn from_node(node: Node) -> Self {
        Self {
            node: Arc::new(node),
            not_applicable: None,
        }
    }

    /// Creates a single column: one row of width 1 per value.
    /// 创建单列：每个值对应一个宽度为 1 的数据行。
    pub fn column<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let rows = values.into_iter().map(|v| vec![v.into()]).collect();
        Self::from_node(Node::Literal {
            width: 1,
            rows: Arc::new(rows),
        })
    }

    /// Creates a literal table from explicit rows. All rows must share one width.
    /// 从显式数据行创建字面量表。所有数据行必须具有相同宽度。
    pub fn rows(rows: Vec<Row>) -> Result<Self, HarnessError> {
        let width = rows.first().map_or(0, Vec::len);
        if let Some((index, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != width) {
            return Err(HarnessError::configuration(format!(
                "literal rows must share one width: row {} has {} cells, expected {}",
                index,
                row.len(),
                width
            )));
        }
        Ok(Self::from_node(Node::Literal {
            width,
            rows: Arc::new(rows),
        }))
    }

    /// Number of cells in every row.
    pub fn width(&self) -> usize {
        match &*self.node {
            Node::Literal { width, .. } => *width,
            Node::Product(left, right) | Node::Zip(left, right) => left.width() + right.width(),
            Node::Intersection(left, _) => left.width(),
        }
    }

    /// Number of rows. Intersections are counted by iterating them.
    pub fn len(&self) -> usize {
        match &*self.node {
            Node::Literal { rows, .. } => rows.len(),
            Node::Product(left, right) => left.len().saturating_mul(right.len()),
            Node::Zip(left, right) => {
                let (l, r) = (left.len(), right.len());
                if l == 0 || r == 0 { 0 } else { l.max(r) }
            }
            Node::Intersection(..) => self.raw_rows().count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cartesian product. The result has `|self| * |other|` rows; `self` varies slowest.
    /// 笛卡尔积。结果有 `|self| * |other|` 行；`self` 变化最慢。
    pub fn multiply(&self, other: &Values) -> Values {
        Self::from_node(Node::Product(self.operand(), other.operand()))
    }

    /// Positional zip: `max(|self|, |other|)` rows, row `i` joining
    /// `self[i mod |self|]` with `other[i mod |other|]`. Empty if either side is.
    ///
    /// 按位置配对：结果有 `max(|self|, |other|)` 行，第 `i` 行由
    /// `self[i mod |self|]` 与 `other[i mod |other|]` 拼接而成。任一侧为空则结果为空。
    pub fn pseudo_multiply(&self, other: &Values) -> Values {
        Self::from_node(Node::Zip(self.operand(), other.operand()))
    }

    /// Rows of `self`, in order and without duplicates, that also occur in
    /// `other`. Operands of different widths never share a row.
    ///
    /// `self` 中同样出现在 `other` 中的数据行（保持顺序，去重）。
    /// 宽度不同的操作数没有公共行。
    pub fn intersect(&self, other: &Values) -> Values {
        Self::from_node(Node::Intersection(self.operand(), other.operand()))
    }

    /// Left fold of `columns` with `combination`, in declaration order.
    /// Returns `None` when there are no columns.
    pub fn combine_all(columns: &[Values], combination: Combination) -> Option<Values> {
        let (first, rest) = columns.split_first()?;
        Some(
            rest.iter()
                .fold(first.clone(), |acc, column| combination.combine(&acc, column)),
        )
    }

    /// Marks the rows matched by `indices` as not applicable. Iteration still
    /// visits them, flagged with `applicable == false`.
    ///
    /// 将 `indices` 匹配的数据行标记为不适用。迭代仍会访问这些行，
    /// 但会将 `applicable` 标记为 `false`。
    pub fn with_not_applicable(&self, indices: ExcludedIndices) -> Values {
        Self {
            node: Arc::clone(&self.node),
            not_applicable: Some(Arc::new(indices)),
        }
    }

    /// Starts a fresh, single-pass iteration over the rows.
    /// 开始一次新的单遍行迭代。
    pub fn iter(&self) -> RowIter {
        RowIter {
            rows: self.raw_rows(),
            next_index: 0,
            not_applicable: self.not_applicable.clone(),
        }
    }

    // Operands drop their not-applicable marks; marks only apply to the outermost iteration.
    fn operand(&self) -> Values {
        Self {
            node: Arc::clone(&self.node),
            not_applicable: None,
        }
    }

    fn raw_rows(&self) -> Box<dyn Iterator<Item = Row>> {
        match &*self.node {
            Node::Literal { rows, .. } => {
                let rows = Arc::clone(rows);
                Box::new((0..rows.len()).map(move |i| rows[i].clone()))
            }
            Node::Product(left, right) => {
                let right = right.clone();
                Box::new(left.raw_rows().flat_map(move |outer| {
                    right.raw_rows().map(move |inner| concat(&outer, inner))
                }))
            }
            Node::Zip(left, right) => {
                let (l, r) = (left.len(), right.len());
                if l == 0 || r == 0 {
                    return Box::new(std::iter::empty());
                }
                let mut lefts = Cycle::new(left.clone());
                let mut rights = Cycle::new(right.clone());
                Box::new((0..l.max(r)).map_while(move |_| {
                    let outer = lefts.next_row()?;
                    let inner = rights.next_row()?;
                    Some(concat(&outer, inner))
                }))
            }
            Node::Intersection(left, right) => {
                if left.width() != right.width() {
                    return Box::new(std::iter::empty());
                }
                let candidates: Vec<Row> = right.raw_rows().collect();
                let mut seen: Vec<Row> = Vec::new();
                Box::new(left.raw_rows().filter(move |row| {
                    if candidates.contains(row) && !seen.contains(row) {
                        seen.push(row.clone());
                        true
                    } else {
                        false
                    }
                }))
            }
        }
    }
}

fn concat(outer: &[Value], inner: Row) -> Row {
    let mut row = Vec::with_capacity(outer.len() + inner.len());
    row.extend_from_slice(outer);
    row.extend(inner);
    row
}

/// Restarts the source iterator whenever it runs dry.
struct Cycle {
    source: Values,
    current: Box<dyn Iterator<Item = Row>>,
}

impl Cycle {
    fn new(source: Values) -> Self {
        let current = source.raw_rows();
        Self { source, current }
    }

    fn next_row(&mut self) -> Option<Row> {
        if let Some(row) = self.current.next() {
            return Some(row);
        }
        self.current = self.source.raw_rows();
        self.current.next()
    }
}

/// A row produced by `RowIter`, tagged with its 0-based position.
/// 由 `RowIter` 产生的数据行，带有从 0 开始的位置。
#[derive(Debug, Clone, PartialEq)]
pub struct DataRow {
    pub index: u64,
    pub cells: Row,
    /// `false` when the row was marked not applicable.
    pub applicable: bool,
}

/// Single-pass iterator over the rows of a `Values`.
pub struct RowIter {
    rows: Box<dyn Iterator<Item = Row>>,
    next_index: u64,
    not_applicable: Option<Arc<ExcludedIndices>>,
}

impl Iterator for RowIter {
    type Item = DataRow;

    fn next(&mut self) -> Option<DataRow> {
        let cells = self.rows.next()?;
        let index = self.next_index;
        self.next_index += 1;
        let applicable = !self
            .not_applicable
            .as_ref()
            .is_some_and(|indices| indices.contains(index));
        Some(DataRow {
            index,
            cells,
            applicable,
        })
    }
}

impl fmt::Debug for RowIter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowIter")
            .field("next_index", &self.next_index)
            .finish_non_exhaustive()
    }
}
