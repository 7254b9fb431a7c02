//! # Configuration Module / 配置模块
//!
//! Two kinds of configuration live here: the declarative `TestCaseDescriptor`
//! attached to each test case when a group is built, and the `HarnessConfig`
//! loaded from a TOML file that carries the exclusion lists of a run.
//!
//! 这里有两种配置：构建测试组时附加到每个测试用例的声明式 `TestCaseDescriptor`，
//! 以及从 TOML 文件加载、携带本次运行排除列表的 `HarnessConfig`。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::exclusion::{parse_name_list, ExclusionList, ExclusionSyntaxError, EXCLUDE_MARKER};
use crate::core::fault::FaultType;
use crate::core::values::{Combination, Values};

/// Declarative description of one test case, resolved once during discovery.
///
/// 单个测试用例的声明式描述，在发现阶段解析一次。
#[derive(Debug, Clone, Default)]
pub struct TestCaseDescriptor {
    /// `true` when the method was explicitly marked as a test case. Unmarked
    /// methods are only picked up when their name starts with `test`.
    /// 当方法被显式标记为测试用例时为 `true`。未标记的方法仅在名称以 `test` 开头时被识别。
    pub is_test_case: bool,
    /// Name of the hook run before every invocation.
    /// 每次调用前运行的钩子名称。
    pub before_method: Option<String>,
    /// Name of the hook run after every invocation.
    /// 每次调用后运行的钩子名称。
    pub after_method: Option<String>,
    /// Fault types the test case is expected to raise. `Some(vec![])` is a
    /// configuration error.
    /// 测试用例预期抛出的故障类型。`Some(vec![])` 属于配置错误。
    pub expected_exception_types: Option<Vec<FaultType>>,
    /// Name of the group method or field that supplies the rows.
    /// 提供数据行的测试组方法或字段名称。
    pub data_source: Option<String>,
    /// Inline literal columns, one per parameter, in declaration order.
    /// 内联字面量列，每个参数一列，按声明顺序排列。
    pub parameter_columns: Vec<Values>,
    /// Explicitly selected combination operator for `parameter_columns`.
    /// 为 `parameter_columns` 显式选择的组合运算符。
    pub combination: Option<Combination>,
}

impl TestCaseDescriptor {
    /// A descriptor for an explicitly marked test case.
    pub fn marked() -> Self {
        Self {
            is_test_case: true,
            ..Self::default()
        }
    }

    /// A descriptor for a method discovered by naming convention.
    pub fn by_convention() -> Self {
        Self::default()
    }

    pub fn before(mut self, method: impl Into<String>) -> Self {
        self.before_method = Some(method.into());
        self
    }

    pub fn after(mut self, method: impl Into<String>) -> Self {
        self.after_method = Some(method.into());
        self
    }

    /// Adds `fault_type` to the expected exceptions.
    pub fn expect(mut self, fault_type: FaultType) -> Self {
        self.expected_exception_types
            .get_or_insert_with(Vec::new)
            .push(fault_type);
        self
    }

    pub fn expect_all(mut self, fault_types: Vec<FaultType>) -> Self {
        self.expected_exception_types = Some(fault_types);
        self
    }

    pub fn data(mut self, source: impl Into<String>) -> Self {
        self.data_source = Some(source.into());
        self
    }

    /// Appends an inline literal column for the next parameter.
    pub fn column(mut self, values: Values) -> Self {
        self.parameter_columns.push(values);
        self
    }

    pub fn combine(mut self, combination: Combination) -> Self {
        self.combination = Some(combination);
        self
    }

    /// The operator used for `parameter_columns`: the explicit one if any,
    /// otherwise `PseudoMultiply` for marked test cases and `Multiply` for
    /// convention-discovered ones.
    ///
    /// 用于 `parameter_columns` 的运算符：若有显式指定则使用之，
    /// 否则标记的测试用例使用 `PseudoMultiply`，按约定发现的使用 `Multiply`。
    pub fn effective_combination(&self) -> Combination {
        match self.combination {
            Some(combination) => combination,
            None if self.is_test_case => Combination::PseudoMultiply,
            None => Combination::Multiply,
        }
    }
}

/// Run-level configuration, loaded from a TOML file.
/// 运行级配置，从 TOML 文件加载。
///
/// ```toml
/// language = "en"
/// exclude = ["parse[0..2]", "render"]
/// exclude_cases = ["slow_case"]
/// trim_traces = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// The language for log messages (e.g., "en", "zh-CN").
    /// Defaults to "en" if not specified.
    ///
    /// 日志消息的语言（例如 "en", "zh-CN"）。
    /// 如果未指定，则默认为 "en"。
    #[serde(default = "default_language")]
    pub language: String,

    /// Range directives such as `"foo[1, 3..5]; bar"`.
    /// 范围指令，例如 `"foo[1, 3..5]; bar"`。
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Test case names excluded wholesale.
    /// 整体排除的测试用例名称。
    #[serde(default)]
    pub exclude_cases: Vec<String>,

    /// Whether assertion traces are trimmed to the test group's own code.
    /// 断言轨迹是否裁剪到测试组自身的代码。
    #[serde(default = "default_trim_traces")]
    pub trim_traces: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            exclude: vec![],
            exclude_cases: vec![],
            trim_traces: default_trim_traces(),
        }
    }
}

impl HarnessConfig {
    /// Reads and parses a TOML configuration file.
    /// 读取并解析 TOML 配置文件。
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read harness config: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse harness config: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid harness config TOML")
    }

    /// Merges the `--exclude a,b` name lists found in an argument stream.
    /// Unrelated tokens are ignored.
    ///
    /// 合并参数流中的 `--exclude a,b` 名称列表。无关的标记会被忽略。
    pub fn with_arguments<S: AsRef<str>>(mut self, tokens: &[S]) -> Self {
        for name in parse_name_list(tokens, EXCLUDE_MARKER) {
            if !self.exclude_cases.contains(&name) {
                self.exclude_cases.push(name);
            }
        }
        self
    }

    /// Builds the exclusion list. The first malformed directive aborts the load.
    /// 构建排除列表。第一个格式错误的指令会中止加载。
    pub fn exclusions(&self) -> Result<ExclusionList, ExclusionSyntaxError> {
        let mut list = ExclusionList::new();
        for directive in &self.exclude {
            list.add_directive(directive)?;
        }
        list.exclude_cases(&self.exclude_cases);
        Ok(list)
    }
}

fn default_language() -> String {
    "en".to_string()
}

fn default_trim_traces() -> bool {
    true
}
