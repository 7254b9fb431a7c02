//! # Test Group Module / 测试组模块
//!
//! A `TestGroup` is the object under test: a set of target callables with
//! their descriptors, plus the named hooks and value sources those
//! descriptors refer to. `TestGroup::discover` resolves every descriptor once
//! into a `ResolvedCase`; nothing is looked up by name during execution.
//!
//! `TestGroup` 是被测对象：一组带有描述符的目标可调用对象，
//! 以及这些描述符所引用的具名钩子和值来源。`TestGroup::discover`
//! 将每个描述符一次性解析为 `ResolvedCase`；执行期间不会再按名称查找。

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::panic::Location;
use std::rc::Rc;

use crate::core::config::TestCaseDescriptor;
use crate::core::error::HarnessError;
use crate::core::fault::{Fault, FaultType, Frame};
use crate::core::values::{render_row, Combination, ParamType, Value, Values};

/// Name prefix that makes an unmarked method a test case.
/// 使未标记方法成为测试用例的名称前缀。
pub const CONVENTION_PREFIX: &str = "test";

pub type TestFn = Rc<dyn Fn(&[Value]) -> Result<Value, Fault>>;
pub type HookFn = Rc<dyn Fn() -> Result<(), Fault>>;
pub type SourceFn = Rc<dyn Fn() -> Result<Values, Fault>>;

/// A resolved, directly callable test method and its declared parameters.
/// 已解析、可直接调用的测试方法及其声明的参数。
#[derive(Clone)]
pub struct Target {
    name: String,
    params: Vec<ParamType>,
    variadic: Option<ParamType>,
    func: TestFn,
}

impl Target {
    pub fn new<F>(name: impl Into<String>, params: Vec<ParamType>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, Fault> + 'static,
    {
        Self {
            name: name.into(),
            params,
            variadic: None,
            func: Rc::new(func),
        }
    }

    /// Declares a trailing variable-length parameter with the given element type.
    /// 声明一个具有给定元素类型的尾部可变长度参数。
    pub fn variadic(mut self, element: ParamType) -> Self {
        self.variadic = Some(element);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The fixed parameters, excluding the variadic tail.
    pub fn params(&self) -> &[ParamType] {
        &self.params
    }

    pub fn variadic_element(&self) -> Option<&ParamType> {
        self.variadic.as_ref()
    }

    /// Declared parameter shapes, e.g. `(int, str, float...)`.
    pub fn declared_shape(&self) -> String {
        let mut shapes: Vec<String> = self.params.iter().map(ToString::to_string).collect();
        if let Some(element) = &self.variadic {
            shapes.push(format!("{}...", element));
        }
        format!("({})", shapes.join(", "))
    }

    /// Verifies that `args` fit the declared parameters. A variadic target
    /// expects its tail already packed into one trailing array.
    ///
    /// 验证 `args` 是否符合声明的参数。可变参数目标要求其尾部已被打包为一个数组。
    pub fn check_arguments(&self, args: &[Value]) -> Result<(), Fault> {
        let tail = self.variadic.clone().map(ParamType::array_of);
        let expected: Vec<&ParamType> = self.params.iter().chain(tail.as_ref()).collect();

        let fits = expected.len() == args.len()
            && expected.iter().zip(args).all(|(param, arg)| param.accepts(arg));
        if fits {
            Ok(())
        } else {
            Err(self.mismatch(args))
        }
    }

    /// Packs the values past the fixed parameters into one array of the
    /// variadic element type, unless the row already ends with exactly such
    /// an array. Non-variadic targets get `args` back unchanged.
    ///
    /// 将固定参数之后的值打包为一个可变参数元素类型的数组，
    /// 除非该行已经恰好以这样的数组结尾。非可变参数目标原样返回 `args`。
    pub fn adapt_variadic(&self, args: &[Value]) -> Result<Vec<Value>, Fault> {
        let Some(element) = &self.variadic else {
            return Ok(args.to_vec());
        };
        let fixed = self.params.len();
        if args.len() < fixed {
            return Err(self.mismatch(args));
        }

        let array_type = ParamType::array_of(element.clone());
        if args.len() == fixed + 1 && array_type.accepts(&args[fixed]) {
            return Ok(args.to_vec());
        }

        let mut packed = Vec::with_capacity(args.len() - fixed);
        for value in &args[fixed..] {
            match value.coerce_to(element) {
                Some(item) => packed.push(item),
                None => return Err(self.mismatch(args)),
            }
        }

        let mut adapted = args[..fixed].to_vec();
        adapted.push(Value::array(element.clone(), packed));
        Ok(adapted)
    }

    pub(crate) fn call(&self, args: &[Value]) -> Result<Value, Fault> {
        (self.func)(args)
    }

    fn mismatch(&self, args: &[Value]) -> Fault {
        let types: Vec<String> = args.iter().map(|a| a.param_type().to_string()).collect();
        Fault::argument_mismatch(format!(
            "cannot call {} with arguments [{}] of types ({}); declared parameters: {}",
            self.name,
            render_row(args),
            types.join(", "),
            self.declared_shape()
        ))
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("name", &self.name)
            .field("shape", &self.declared_shape())
            .finish_non_exhaustive()
    }
}

/// Where a data source gets its rows from.
/// 数据来源获取数据行的位置。
#[derive(Clone)]
pub enum ValueSource {
    /// A field holding a ready-made `Values`.
    Field(Values),
    /// A method that builds the `Values` when the test case starts.
    Method(SourceFn),
}

impl ValueSource {
    pub fn produce(&self) -> Result<Values, Fault> {
        match self {
            ValueSource::Field(values) => Ok(values.clone()),
            ValueSource::Method(build) => build(),
        }
    }
}

impl fmt::Debug for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSource::Field(values) => f.debug_tuple("Field").field(values).finish(),
            ValueSource::Method(_) => f.write_str("Method(..)"),
        }
    }
}

/// A named hook resolved from a descriptor.
#[derive(Clone)]
pub struct Hook {
    pub name: String,
    pub func: HookFn,
}

impl Hook {
    pub fn run(&self) -> Result<(), Fault> {
        (self.func)()
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook").field("name", &self.name).finish_non_exhaustive()
    }
}

/// How a resolved test case obtains its rows.
/// 已解析测试用例获取数据行的方式。
#[derive(Debug, Clone)]
pub enum DataBinding {
    /// Called exactly once with no arguments.
    None,
    /// Rows come from a named group method or field.
    Source { name: String, source: ValueSource },
    /// Rows come from inline parameter columns.
    Inline {
        columns: Vec<Values>,
        combination: Combination,
    },
}

impl DataBinding {
    pub fn is_data_bound(&self) -> bool {
        !matches!(self, DataBinding::None)
    }

    /// Builds the rows. Called once per test case drive.
    pub fn build(&self) -> Result<Values, Fault> {
        match self {
            DataBinding::None => Ok(Values::column(Vec::<Value>::new())),
            DataBinding::Source { source, .. } => source.produce(),
            DataBinding::Inline {
                columns,
                combination,
            } => Values::combine_all(columns, *combination).ok_or_else(|| {
                Fault::misconfiguration("inline data binding declares no parameter columns")
            }),
        }
    }
}

/// A test case with every descriptor reference resolved.
/// 所有描述符引用都已解析的测试用例。
#[derive(Debug, Clone)]
pub struct ResolvedCase {
    pub name: String,
    pub target: Target,
    pub before: Option<Hook>,
    pub after: Option<Hook>,
    pub expected: Vec<FaultType>,
    pub binding: DataBinding,
}

#[derive(Debug, Clone)]
struct Declaration {
    target: Target,
    descriptor: TestCaseDescriptor,
}

/// The object under test.
/// 被测对象。
pub struct TestGroup {
    name: String,
    own_code: Vec<String>,
    declarations: Vec<Declaration>,
    sources: HashMap<String, ValueSource>,
    hooks: HashMap<String, HookFn>,
}

impl TestGroup {
    /// Starts building a group. The caller's source file is recorded as the
    /// group's own code for trace trimming.
    ///
    /// 开始构建测试组。调用者的源文件会被记录为测试组自身的代码，用于轨迹裁剪。
    #[track_caller]
    pub fn builder(name: impl Into<String>) -> TestGroupBuilder {
        TestGroupBuilder {
            group: TestGroup {
                name: name.into(),
                own_code: vec![Location::caller().file().to_string()],
                declarations: Vec::new(),
                sources: HashMap::new(),
                hooks: HashMap::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `true` if `frame` lies in one of the group's own source paths.
    pub fn is_own_code(&self, frame: &Frame) -> bool {
        self.own_code.iter().any(|prefix| frame.file.starts_with(prefix.as_str()))
    }

    /// Resolves every test case descriptor, in declaration order.
    ///
    /// Methods that are neither marked nor named by convention are skipped.
    /// Unknown hook or source names, empty expected-exception lists, duplicate
    /// case names, and a data source attached together with inline columns
    /// are configuration errors.
    ///
    /// 按声明顺序解析每个测试用例描述符。
    /// 既未标记也不符合命名约定的方法会被跳过。未知的钩子或来源名称、
    /// 空的预期异常列表、重复的用例名称，以及同时附加数据来源和内联列，
    /// 都属于配置错误。
    pub fn discover(&self) -> Result<Vec<ResolvedCase>, HarnessError> {
        let mut seen = HashSet::new();
        let mut cases = Vec::new();

        for declaration in &self.declarations {
            let Declaration { target, descriptor } = declaration;
            if !descriptor.is_test_case && !target.name().starts_with(CONVENTION_PREFIX) {
                continue;
            }
            if !seen.insert(target.name().to_string()) {
                return Err(HarnessError::configuration(format!(
                    "test case '{}' is declared more than once in group '{}'",
                    target.name(),
                    self.name
                )));
            }
            cases.push(self.resolve(target, descriptor)?);
        }
        Ok(cases)
    }

    fn resolve(
        &self,
        target: &Target,
        descriptor: &TestCaseDescriptor,
    ) -> Result<ResolvedCase, HarnessError> {
        let case = target.name();

        let expected = match &descriptor.expected_exception_types {
            Some(types) if types.is_empty() => {
                return Err(HarnessError::configuration(format!(
                    "test case '{}' declares an empty expected-exception list",
                    case
                )));
            }
            Some(types) => types.clone(),
            None => Vec::new(),
        };

        let binding = match (&descriptor.data_source, descriptor.parameter_columns.is_empty()) {
            (Some(name), false) => {
                return Err(HarnessError::configuration(format!(
                    "test case '{}' attaches data source '{}' and inline parameter columns at the same time",
                    case, name
                )));
            }
            (Some(name), true) => {
                let source = self.sources.get(name).cloned().ok_or_else(|| {
                    HarnessError::configuration(format!(
                        "test case '{}' refers to unknown data source '{}'",
                        case, name
                    ))
                })?;
                DataBinding::Source {
                    name: name.clone(),
                    source,
                }
            }
            (None, false) => DataBinding::Inline {
                columns: descriptor.parameter_columns.clone(),
                combination: descriptor.effective_combination(),
            },
            (None, true) => DataBinding::None,
        };

        Ok(ResolvedCase {
            name: case.to_string(),
            target: target.clone(),
            before: self.resolve_hook(case, descriptor.before_method.as_deref())?,
            after: self.resolve_hook(case, descriptor.after_method.as_deref())?,
            expected,
            binding,
        })
    }

    fn resolve_hook(&self, case: &str, name: Option<&str>) -> Result<Option<Hook>, HarnessError> {
        let Some(name) = name else {
            return Ok(None);
        };
        let func = self.hooks.get(name).cloned().ok_or_else(|| {
            HarnessError::configuration(format!(
                "test case '{}' refers to unknown hook '{}'",
                case, name
            ))
        })?;
        Ok(Some(Hook {
            name: name.to_string(),
            func,
        }))
    }
}

impl fmt::Debug for TestGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestGroup")
            .field("name", &self.name)
            .field("declarations", &self.declarations.len())
            .finish_non_exhaustive()
    }
}

/// Builder for `TestGroup`.
pub struct TestGroupBuilder {
    group: TestGroup,
}

impl TestGroupBuilder {
    /// Adds a source path prefix that counts as the group's own code.
    pub fn own_code(mut self, path_prefix: impl Into<String>) -> Self {
        self.group.own_code.push(path_prefix.into());
        self
    }

    /// Registers a field holding ready-made rows.
    pub fn field(mut self, name: impl Into<String>, values: Values) -> Self {
        self.group.sources.insert(name.into(), ValueSource::Field(values));
        self
    }

    /// Registers a method that builds rows when a test case starts.
    pub fn source<F>(mut self, name: impl Into<String>, build: F) -> Self
    where
        F: Fn() -> Result<Values, Fault> + 'static,
    {
        self.group
            .sources
            .insert(name.into(), ValueSource::Method(Rc::new(build)));
        self
    }

    /// Registers a named before/after hook.
    pub fn hook<F>(mut self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn() -> Result<(), Fault> + 'static,
    {
        self.group.hooks.insert(name.into(), Rc::new(hook));
        self
    }

    /// Declares a method together with its descriptor.
    pub fn case(mut self, target: Target, descriptor: TestCaseDescriptor) -> Self {
        self.group.declarations.push(Declaration { target, descriptor });
        self
    }

    pub fn build(self) -> TestGroup {
        self.group
    }
}
