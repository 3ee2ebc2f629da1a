//! Static catalog of tunable clang-format options.
//!
//! Candidate values were extracted from the documentation of clang-format
//! version 13: <https://releases.llvm.org/13.0.0/tools/clang/docs/ClangFormatStyleOptions.html>
//!
//! Sub-options of nested sections are flattened with a `:` delimiter
//! (`BraceWrapping:AfterClass`), matching the flattened key form used
//! throughout [`crate::config::StyleConfig`].

use std::fmt;

use crate::config::StyleConfig;

/// Value domain of a single tunable option.
#[derive(Debug, Clone, Copy)]
pub enum Domain {
    /// Finite enumeration of named values, in declared order.
    Enum(&'static [&'static str]),
    /// `false` / `true`.
    Bool,
    /// Inclusive integer range walked with a step.
    IntRange { min: i64, max: i64, step: i64 },
}

impl Domain {
    /// Candidate values in declared enumeration order.
    pub fn candidates(&self) -> Vec<String> {
        match *self {
            Domain::Enum(values) => values.iter().map(|v| (*v).to_string()).collect(),
            Domain::Bool => vec!["false".to_string(), "true".to_string()],
            Domain::IntRange { min, max, step } => {
                let mut values = vec![];
                let mut n = min;
                while n <= max {
                    values.push(n.to_string());
                    n += step;
                }
                values
            }
        }
    }

    /// Whether `value` is one of the declared candidates.
    pub fn contains(&self, value: &str) -> bool {
        match *self {
            Domain::Enum(values) => values.contains(&value),
            Domain::Bool => value == "false" || value == "true",
            Domain::IntRange { min, max, step } => value
                .parse::<i64>()
                .is_ok_and(|n| n >= min && n <= max && (n - min) % step == 0),
        }
    }
}

/// One tunable option: identifier, domain, default, dependency edges.
#[derive(Debug, Clone, Copy)]
pub struct OptionDef {
    pub name: &'static str,
    pub domain: Domain,
    pub default: &'static str,
    /// Options whose resolved value conditions this option's candidate set.
    pub depends_on: &'static [&'static str],
}

/// Error type for catalog lookups: referencing an unknown option is a
/// configuration error and aborts the run before any evaluation.
#[derive(Debug)]
pub struct CatalogError {
    pub option: String,
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown option: {}", self.option)
    }
}

impl std::error::Error for CatalogError {}

const fn opt(name: &'static str, domain: Domain, default: &'static str) -> OptionDef {
    OptionDef {
        name,
        domain,
        default,
        depends_on: &[],
    }
}

const fn dep(
    name: &'static str,
    domain: Domain,
    default: &'static str,
    depends_on: &'static [&'static str],
) -> OptionDef {
    OptionDef {
        name,
        domain,
        default,
        depends_on,
    }
}

const ALIGN_CONSECUTIVE: &[&str] = &[
    "None",
    "Consecutive",
    "AcrossEmptyLines",
    "AcrossComments",
    "AcrossEmptyLinesAndComments",
];

const BRACE_PRESETS: &[&str] = &[
    "Custom",
    "Attach",
    "Linux",
    "Mozilla",
    "Stroustrup",
    "Allman",
    "Whitesmiths",
    "GNU",
    "WebKit",
];

/// Options searched before all others: these dominate the layout, so
/// resolving them first lets the rest converge in fewer passes.
pub const PRIORITY_OPTIONS: &[&str] = &[
    "BasedOnStyle",
    "IndentWidth",
    "UseTab",
    "SortIncludes",
    "IncludeBlocks",
];

#[rustfmt::skip]
static OPTIONS: &[OptionDef] = &[
    opt("AccessModifierOffset", Domain::IntRange { min: -4, max: 0, step: 1 }, "-2"),
    opt("AlignAfterOpenBracket", Domain::Enum(&["Align", "DontAlign", "AlwaysBreak"]), "Align"),
    opt("AlignArrayOfStructures", Domain::Enum(&["Left", "Right", "None"]), "None"),
    opt("AlignConsecutiveAssignments", Domain::Enum(ALIGN_CONSECUTIVE), "None"),
    opt("AlignConsecutiveBitFields", Domain::Enum(ALIGN_CONSECUTIVE), "None"),
    opt("AlignConsecutiveDeclarations", Domain::Enum(ALIGN_CONSECUTIVE), "None"),
    opt("AlignConsecutiveMacros", Domain::Enum(ALIGN_CONSECUTIVE), "None"),
    opt("AlignEscapedNewlines", Domain::Enum(&["DontAlign", "Left", "Right"]), "Right"),
    opt("AlignOperands", Domain::Enum(&["DontAlign", "Align", "AlignAfterOperator"]), "Align"),
    opt("AlignTrailingComments", Domain::Bool, "true"),
    opt("AllowAllArgumentsOnNextLine", Domain::Bool, "true"),
    opt("AllowAllConstructorInitializersOnNextLine", Domain::Bool, "true"),
    opt("AllowAllParametersOfDeclarationOnNextLine", Domain::Bool, "true"),
    opt("AllowShortBlocksOnASingleLine", Domain::Enum(&["Never", "Empty", "Always"]), "Never"),
    opt("AllowShortCaseLabelsOnASingleLine", Domain::Bool, "false"),
    opt("AllowShortEnumsOnASingleLine", Domain::Bool, "true"),
    opt("AllowShortFunctionsOnASingleLine", Domain::Enum(&["None", "InlineOnly", "Empty", "Inline", "All"]), "All"),
    opt("AllowShortIfStatementsOnASingleLine", Domain::Enum(&["Never", "WithoutElse", "OnlyFirstIf", "AllIfsAndElse"]), "Never"),
    opt("AllowShortLambdasOnASingleLine", Domain::Enum(&["None", "Empty", "Inline", "All"]), "All"),
    opt("AllowShortLoopsOnASingleLine", Domain::Bool, "false"),
    opt("AlwaysBreakAfterDefinitionReturnType", Domain::Enum(&["None", "All", "TopLevel"]), "None"),
    opt("AlwaysBreakAfterReturnType", Domain::Enum(&["None", "All", "TopLevel", "AllDefinitions", "TopLevelDefinitions"]), "None"),
    opt("AlwaysBreakBeforeMultilineStrings", Domain::Bool, "false"),
    opt("AlwaysBreakTemplateDeclarations", Domain::Enum(&["No", "MultiLine", "Yes"]), "MultiLine"),
    opt("BasedOnStyle", Domain::Enum(&["LLVM", "Google", "Chromium", "Mozilla", "WebKit", "Microsoft", "GNU"]), "LLVM"),
    opt("BinPackArguments", Domain::Bool, "true"),
    dep("BinPackParameters", Domain::Bool, "true", &["InsertTrailingCommas"]),
    opt("BitFieldColonSpacing", Domain::Enum(&["Both", "None", "Before", "After"]), "Both"),
    opt("BreakBeforeBraces", Domain::Enum(BRACE_PRESETS), "Custom"),
    dep("BraceWrapping:AfterCaseLabel", Domain::Bool, "false", &["BreakBeforeBraces"]),
    dep("BraceWrapping:AfterClass", Domain::Bool, "false", &["BreakBeforeBraces"]),
    dep("BraceWrapping:AfterControlStatement", Domain::Enum(&["Never", "MultiLine", "Always"]), "Never", &["BreakBeforeBraces"]),
    dep("BraceWrapping:AfterEnum", Domain::Bool, "false", &["BreakBeforeBraces"]),
    dep("BraceWrapping:AfterFunction", Domain::Bool, "false", &["BreakBeforeBraces"]),
    dep("BraceWrapping:AfterNamespace", Domain::Bool, "false", &["BreakBeforeBraces"]),
    dep("BraceWrapping:AfterStruct", Domain::Bool, "false", &["BreakBeforeBraces"]),
    dep("BraceWrapping:AfterUnion", Domain::Bool, "false", &["BreakBeforeBraces"]),
    dep("BraceWrapping:AfterExternBlock", Domain::Bool, "false", &["BreakBeforeBraces"]),
    dep("BraceWrapping:BeforeCatch", Domain::Bool, "false", &["BreakBeforeBraces"]),
    dep("BraceWrapping:BeforeElse", Domain::Bool, "false", &["BreakBeforeBraces"]),
    dep("BraceWrapping:BeforeLambdaBody", Domain::Bool, "false", &["BreakBeforeBraces"]),
    dep("BraceWrapping:BeforeWhile", Domain::Bool, "false", &["BreakBeforeBraces"]),
    dep("BraceWrapping:IndentBraces", Domain::Bool, "false", &["BreakBeforeBraces"]),
    dep("BraceWrapping:SplitEmptyFunction", Domain::Bool, "true", &["BreakBeforeBraces"]),
    dep("BraceWrapping:SplitEmptyRecord", Domain::Bool, "true", &["BreakBeforeBraces"]),
    dep("BraceWrapping:SplitEmptyNamespace", Domain::Bool, "true", &["BreakBeforeBraces"]),
    opt("BreakBeforeBinaryOperators", Domain::Enum(&["None", "NonAssignment", "All"]), "None"),
    opt("BreakBeforeConceptDeclarations", Domain::Bool, "true"),
    opt("BreakBeforeInheritanceComma", Domain::Bool, "false"),
    opt("BreakBeforeTernaryOperators", Domain::Bool, "true"),
    opt("BreakConstructorInitializersBeforeComma", Domain::Bool, "false"),
    opt("BreakConstructorInitializers", Domain::Enum(&["BeforeColon", "BeforeComma", "AfterColon"]), "BeforeColon"),
    opt("BreakInheritanceList", Domain::Enum(&["BeforeColon", "BeforeComma", "AfterColon", "AfterComma"]), "BeforeColon"),
    opt("BreakStringLiterals", Domain::Bool, "true"),
    opt("ColumnLimit", Domain::Enum(&["80", "120", "0"]), "80"),
    opt("CompactNamespaces", Domain::Bool, "false"),
    opt("ConstructorInitializerAllOnOneLineOrOnePerLine", Domain::Bool, "false"),
    opt("ConstructorInitializerIndentWidth", Domain::Enum(&["0", "2", "3", "4", "6", "8"]), "4"),
    opt("ContinuationIndentWidth", Domain::Enum(&["0", "2", "3", "4", "6", "8"]), "4"),
    opt("Cpp11BracedListStyle", Domain::Bool, "true"),
    opt("EmptyLineAfterAccessModifier", Domain::Enum(&["Never", "Leave", "Always"]), "Never"),
    opt("EmptyLineBeforeAccessModifier", Domain::Enum(&["Never", "Leave", "LogicalBlock", "Always"]), "LogicalBlock"),
    opt("FixNamespaceComments", Domain::Bool, "true"),
    opt("IncludeBlocks", Domain::Enum(&["Preserve", "Merge", "Regroup"]), "Preserve"),
    opt("IndentAccessModifiers", Domain::Bool, "false"),
    opt("IndentCaseBlocks", Domain::Bool, "false"),
    opt("IndentCaseLabels", Domain::Bool, "false"),
    opt("IndentExternBlock", Domain::Enum(&["AfterExternBlock", "NoIndent", "Indent"]), "AfterExternBlock"),
    opt("IndentGotoLabels", Domain::Bool, "true"),
    opt("IndentPPDirectives", Domain::Enum(&["None", "AfterHash", "BeforeHash"]), "None"),
    opt("IndentRequires", Domain::Bool, "false"),
    opt("IndentWidth", Domain::Enum(&["2", "3", "4", "8"]), "2"),
    opt("IndentWrappedFunctionNames", Domain::Bool, "false"),
    dep("InsertTrailingCommas", Domain::Enum(&["None", "Wrapped"]), "None", &["BinPackParameters"]),
    opt("KeepEmptyLinesAtTheStartOfBlocks", Domain::Bool, "true"),
    opt("LambdaBodyIndentation", Domain::Enum(&["Signature", "OuterScope"]), "Signature"),
    opt("MaxEmptyLinesToKeep", Domain::IntRange { min: 1, max: 3, step: 1 }, "1"),
    opt("NamespaceIndentation", Domain::Enum(&["None", "Inner", "All"]), "None"),
    opt("PenaltyBreakAssignment", Domain::Enum(&["2", "100", "1000"]), "2"),
    opt("PenaltyBreakBeforeFirstCallParameter", Domain::Enum(&["1", "19", "100"]), "19"),
    opt("PenaltyBreakComment", Domain::Enum(&["300"]), "300"),
    opt("PenaltyBreakFirstLessLess", Domain::Enum(&["120"]), "120"),
    opt("PenaltyBreakString", Domain::Enum(&["1000"]), "1000"),
    opt("PenaltyBreakTemplateDeclaration", Domain::Enum(&["10"]), "10"),
    opt("PenaltyExcessCharacter", Domain::Enum(&["100", "1000000"]), "1000000"),
    opt("PenaltyReturnTypeOnItsOwnLine", Domain::Enum(&["60", "200", "1000"]), "60"),
    opt("PenaltyIndentedWhitespace", Domain::IntRange { min: 0, max: 1, step: 1 }, "0"),
    opt("PointerAlignment", Domain::Enum(&["Left", "Right", "Middle"]), "Right"),
    opt("ReferenceAlignment", Domain::Enum(&["Pointer", "Left", "Right", "Middle"]), "Pointer"),
    opt("ReflowComments", Domain::Bool, "true"),
    opt("ShortNamespaceLines", Domain::IntRange { min: 0, max: 1, step: 1 }, "1"),
    opt("SortIncludes", Domain::Enum(&["Never", "CaseSensitive", "CaseInsensitive"]), "CaseSensitive"),
    opt("SortUsingDeclarations", Domain::Bool, "true"),
    opt("SpaceAfterCStyleCast", Domain::Bool, "false"),
    opt("SpaceAfterLogicalNot", Domain::Bool, "false"),
    opt("SpaceAfterTemplateKeyword", Domain::Bool, "true"),
    opt("SpaceAroundPointerQualifiers", Domain::Enum(&["Default", "Before", "After", "Both"]), "Default"),
    opt("SpaceBeforeAssignmentOperators", Domain::Bool, "true"),
    opt("SpaceBeforeCaseColon", Domain::Bool, "false"),
    opt("SpaceBeforeCpp11BracedList", Domain::Bool, "false"),
    opt("SpaceBeforeCtorInitializerColon", Domain::Bool, "true"),
    opt("SpaceBeforeInheritanceColon", Domain::Bool, "true"),
    opt("SpaceBeforeParens", Domain::Enum(&["Never", "ControlStatements", "ControlStatementsExceptControlMacros", "NonEmptyParentheses", "Always"]), "ControlStatements"),
    opt("SpaceBeforeRangeBasedForLoopColon", Domain::Bool, "true"),
    opt("SpaceInEmptyBlock", Domain::Bool, "false"),
    opt("SpaceInEmptyParentheses", Domain::Bool, "false"),
    opt("SpacesBeforeTrailingComments", Domain::IntRange { min: 0, max: 1, step: 1 }, "1"),
    opt("SpacesInAngles", Domain::Enum(&["Never", "Always", "Leave"]), "Never"),
    opt("SpacesInCStyleCastParentheses", Domain::Bool, "false"),
    opt("SpacesInConditionalStatement", Domain::Bool, "false"),
    opt("SpacesInContainerLiterals", Domain::Bool, "true"),
    opt("SpacesInParentheses", Domain::Bool, "false"),
    opt("SpacesInSquareBrackets", Domain::Bool, "false"),
    opt("SpaceBeforeSquareBrackets", Domain::Bool, "false"),
    opt("Standard", Domain::Enum(&["c++03", "c++11", "c++14", "c++17", "c++20", "Latest"]), "Latest"),
    opt("UseTab", Domain::Enum(&["Never", "ForIndentation", "ForContinuationAndIndentation", "AlignWithSpaces", "Always"]), "Never"),
];

/// All options in catalog declaration order.
pub fn all() -> &'static [OptionDef] {
    OPTIONS
}

/// Whether `name` is a known option identifier.
pub fn is_known(name: &str) -> bool {
    OPTIONS.iter().any(|def| def.name == name)
}

/// Look up an option definition by identifier.
pub fn lookup(name: &str) -> Result<&'static OptionDef, CatalogError> {
    OPTIONS.iter().find(|def| def.name == name).ok_or_else(|| CatalogError {
        option: name.to_string(),
    })
}

/// Unconditioned candidate values of an option, in declared order.
pub fn domain_of(name: &str) -> Result<Vec<String>, CatalogError> {
    lookup(name).map(|def| def.domain.candidates())
}

/// Default value of an option.
pub fn default_of(name: &str) -> Result<&'static str, CatalogError> {
    lookup(name).map(|def| def.default)
}

/// Options whose resolved value conditions this option's candidate set.
pub fn depends_on(name: &str) -> Result<&'static [&'static str], CatalogError> {
    lookup(name).map(|def| def.depends_on)
}

/// Candidate values of an option conditioned on the current resolved
/// configuration. Must be re-derived on every search step: the options this
/// one depends on may have changed earlier in the same pass.
///
/// Rules:
/// - `InsertTrailingCommas=Wrapped` is incompatible with
///   `BinPackParameters=true` (clang-format rejects the combination), so
///   each option's domain drops the conflicting value while the other holds
///   it.
/// - `BraceWrapping:*` sub-options are only consulted by clang-format when
///   `BreakBeforeBraces` is `Custom`; under any preset their domain
///   collapses to the current value, which skips the search for them.
pub fn conditioned_candidates(def: &OptionDef, config: &StyleConfig) -> Vec<String> {
    let mut values = def.domain.candidates();
    if def.name == "InsertTrailingCommas" {
        if config.get("BinPackParameters") == Some("true") {
            values.retain(|v| v != "Wrapped");
        }
    } else if def.name == "BinPackParameters" {
        if config.get("InsertTrailingCommas") == Some("Wrapped") {
            values.retain(|v| v != "true");
        }
    } else if def.name.starts_with("BraceWrapping:")
        && config.get("BreakBeforeBraces") != Some("Custom")
    {
        let current = config.get(def.name).unwrap_or(def.default);
        values = vec![current.to_string()];
    }
    values
}

/// Like [`conditioned_candidates`], looked up by identifier.
pub fn candidates_for(name: &str, config: &StyleConfig) -> Result<Vec<String>, CatalogError> {
    lookup(name).map(|def| conditioned_candidates(def, config))
}

/// Options in the order the search engine visits them: priority options
/// first, then the rest in catalog declaration order.
pub fn search_order() -> Vec<&'static OptionDef> {
    let mut order: Vec<&'static OptionDef> = vec![];
    for name in PRIORITY_OPTIONS {
        if let Some(def) = OPTIONS.iter().find(|def| def.name == *name) {
            order.push(def);
        }
    }
    for def in OPTIONS {
        if !PRIORITY_OPTIONS.contains(&def.name) {
            order.push(def);
        }
    }
    order
}
