use std::collections::HashMap;

use super::{
    preset::Keyword,
    value::{DataObj, FunctionSpec},
};
use crate::syntax::{ExprKind, Expression, Operator, Token, DEFAULT_MAX_DEPTH};

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorConfig {
    /// Treat every identifier as numeric without looking it up.
    pub not_check_ident: bool,
    /// Searched in order, the first keyword with a matching name wins.
    pub preset_keywords: Vec<Keyword>,
    pub preset_functions: HashMap<String, FunctionSpec>,
    /// Deepest tree walked. Trees from the parser never exceed the same default.
    pub max_depth: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            not_check_ident: false,
            preset_keywords: vec![],
            preset_functions: HashMap::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Walks the tree postorder and infers the type each node produces.
pub struct Validator<'c> {
    config: &'c ValidatorConfig,
    depth: usize,
}

impl<'c> Validator<'c> {
    pub fn new(config: &'c ValidatorConfig) -> Self {
        Self { config, depth: 0 }
    }

    /// Only a numeric result means the expression is valid. Anything else comes
    /// back as an error object.
    pub fn validate(&mut self, ast: &Expression) -> DataObj {
        let res = self.eval(ast);
        match res {
            DataObj::Error { .. } | DataObj::Numeric { .. } => res,
            _ => DataObj::error(
                "The expression return value must be numeric",
                crate::error::Diagnostic::NO_OFFSET,
            ),
        }
    }

    fn eval(&mut self, node: &Expression) -> DataObj {
        self.depth += 1;
        let res = if self.depth > self.config.max_depth {
            DataObj::error(
                format!(
                    "Maximum nesting depth exceeded ({}), please check position({})",
                    self.config.max_depth,
                    node.offset()
                ),
                at(node.offset()),
            )
        } else {
            self.eval_node(node)
        };
        self.depth -= 1;
        res
    }

    fn eval_node(&mut self, node: &Expression) -> DataObj {
        let offset = at(node.offset());

        match &node.kind {
            ExprKind::NumericLiteral { value } => DataObj::Numeric {
                value: value.unwrap_or(1.0),
                offset,
            },
            ExprKind::StringLiteral { value } => DataObj::String {
                value: value.to_string(),
                offset,
            },
            ExprKind::Boolean { value } => DataObj::Boolean {
                value: *value,
                offset,
            },
            ExprKind::Identifier { value } => self.eval_identifier(value, offset),
            ExprKind::Function { value } => self.eval_function(value, offset),
            ExprKind::Prefix { operator, right } => {
                let right = self.eval(right);
                if right.is_error() {
                    return right;
                }
                self.eval_prefix(*operator, node.token, right)
            }
            ExprKind::Infix {
                operator,
                left,
                right,
            } => {
                let left = self.eval(left);
                if left.is_error() {
                    return left;
                }
                let right = self.eval(right);
                if right.is_error() {
                    return right;
                }
                self.eval_infix(*operator, node.token, left, right)
            }
            ExprKind::Call {
                function,
                arguments,
            } => {
                let func = self.eval(function);
                if func.is_error() {
                    return func;
                }

                let mut args = Vec::with_capacity(arguments.len());
                for arg in arguments {
                    let arg = self.eval(arg);
                    if arg.is_error() {
                        return arg;
                    }
                    args.push(arg);
                }
                apply_function(func, &args)
            }
        }
    }

    fn eval_identifier(&self, name: &str, offset: isize) -> DataObj {
        if self.config.not_check_ident {
            return DataObj::Numeric { value: 1.0, offset };
        }

        self.config
            .preset_keywords
            .iter()
            .find(|kw| kw.name == name)
            .and_then(|kw| kw.origin(offset))
            .unwrap_or_else(|| {
                DataObj::error(
                    format!("Identifier not found: {name}, please check position({offset})"),
                    offset,
                )
            })
    }

    fn eval_function(&self, name: &str, offset: isize) -> DataObj {
        match self.config.preset_functions.get(name) {
            Some(function) => DataObj::LibFunction {
                function: function.clone(),
                offset,
            },
            None => DataObj::error(
                format!("Function not found: {name}, please check position({offset})"),
                offset,
            ),
        }
    }

    fn eval_prefix(&self, op: Operator, token: Token, right: DataObj) -> DataObj {
        match op {
            // truthiness on the type level only
            Operator::Bang => {
                let value = matches!(
                    right,
                    DataObj::Boolean { value: false, .. } | DataObj::Null { .. }
                );
                DataObj::Boolean {
                    value,
                    offset: right.offset(),
                }
            }
            Operator::Minus => match right {
                DataObj::Numeric { .. } => DataObj::Numeric {
                    value: 1.0,
                    offset: at(token.offset),
                },
                other => DataObj::error(
                    format!("Unknown operator -{}", other.data_type()),
                    other.offset(),
                ),
            },
            other => DataObj::error(
                format!(
                    "Unknown operator: {other}{}, please check position({})",
                    right.data_type(),
                    token.offset
                ),
                at(token.offset),
            ),
        }
    }

    fn eval_infix(&self, op: Operator, token: Token, left: DataObj, right: DataObj) -> DataObj {
        let lt = left.data_type();
        let rt = right.data_type();

        match (&left, &right) {
            (DataObj::Numeric { .. }, DataObj::Numeric { .. }) => {
                if op.is_arithmetic() {
                    DataObj::Numeric {
                        value: 1.0,
                        offset: left.offset(),
                    }
                } else if op.is_comparison() {
                    DataObj::Boolean {
                        value: true,
                        offset: left.offset(),
                    }
                } else {
                    unknown_operator(&left, op, &right, left.offset())
                }
            }
            (DataObj::String { .. }, DataObj::String { .. }) => {
                if op == Operator::Plus {
                    DataObj::String {
                        value: String::new(),
                        offset: left.offset(),
                    }
                } else if op.is_comparison() {
                    DataObj::Boolean {
                        value: true,
                        offset: left.offset(),
                    }
                } else {
                    unknown_operator(&left, op, &right, left.offset())
                }
            }
            _ if matches!(op, Operator::Eq | Operator::NotEq) => DataObj::Boolean {
                value: true,
                offset: left.offset(),
            },
            _ if lt != rt => DataObj::error(
                format!(
                    "Type mismatch: {lt} {op} {rt}, please check position({})",
                    token.offset
                ),
                at(token.offset),
            ),
            _ => unknown_operator(&left, op, &right, at(token.offset)),
        }
    }
}

fn apply_function(func: DataObj, args: &[DataObj]) -> DataObj {
    let (function, offset) = match func {
        DataObj::LibFunction { function, offset } => (function, offset),
        other => {
            return DataObj::error(
                format!("Not a function: {}", other.data_type()),
                other.offset(),
            )
        }
    };

    if !function.uncertain_param {
        if args.len() != function.params.len() {
            return DataObj::error(
                format!(
                    "{} parameters need, but {} found, please check position({})",
                    function.params.len(),
                    args.len(),
                    offset + 1
                ),
                offset,
            );
        }

        for (param, arg) in function.params.iter().zip(args) {
            if param.data_type != arg.data_type() {
                return DataObj::error(
                    format!(
                        "{} type parameter need, but get {} type, please check position({})",
                        param.data_type,
                        arg.data_type(),
                        arg.offset()
                    ),
                    offset,
                );
            }
        }
    }

    log::trace!("call {}() -> {}", function.name, function.return_type);
    DataObj::placeholder(function.return_type, offset).unwrap_or_else(|| {
        DataObj::error(
            format!(
                "Unsupported data type {}, please check position({offset})",
                function.return_type
            ),
            offset,
        )
    })
}

fn unknown_operator(left: &DataObj, op: Operator, right: &DataObj, offset: isize) -> DataObj {
    DataObj::error(
        format!(
            "Unknown operator: {} {op} {}, please check position({offset})",
            left.data_type(),
            right.data_type()
        ),
        offset,
    )
}

fn at(offset: usize) -> isize {
    offset as isize
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::{Validator, ValidatorConfig};
    use crate::{
        runtime::{
            preset::{device_keywords, Keyword},
            value::{DataObj, DataType, FunctionSpec, Param},
        },
        syntax::{Lexer, LexerConfig, Parser, ParserConfig, Token},
    };

    fn eval_str(src: &str, config: &ValidatorConfig) -> DataObj {
        let tokens: Vec<Token> = Lexer::new(src, &LexerConfig::default()).collect();
        let parser_config = ParserConfig::default();
        let ast = Parser::new(&tokens, &parser_config).parse().unwrap();
        Validator::new(config).validate(&ast)
    }

    fn err_msg(src: &str, config: &ValidatorConfig) -> String {
        match eval_str(src, config) {
            DataObj::Error { message, .. } => message,
            other => panic!("expected an error for {src:?}, got {other:?}"),
        }
    }

    fn function(name: &str, params: &[DataType], ret: DataType, variadic: bool) -> FunctionSpec {
        FunctionSpec {
            name: name.into(),
            description: String::new(),
            tag: String::new(),
            return_type: ret,
            params: params
                .iter()
                .enumerate()
                .map(|(index, &data_type)| Param {
                    index,
                    data_type,
                    name: format!("p{index}"),
                })
                .collect(),
            uncertain_param: variadic,
        }
    }

    fn catalog() -> ValidatorConfig {
        let mut keywords = device_keywords();
        keywords.push(Keyword::new("name", DataType::String, "device name"));
        keywords.push(Keyword::new("online", DataType::Boolean, ""));
        keywords.push(Keyword::new("blob", DataType::Object, "opaque payload"));

        let functions = [
            function("sum", &[DataType::Numeric, DataType::Numeric], DataType::Numeric, false),
            function("len", &[DataType::String], DataType::Numeric, false),
            function("max", &[], DataType::Numeric, true),
            function("upper", &[DataType::String], DataType::String, false),
            function("parse", &[DataType::String], DataType::Json, false),
            function("raw", &[], DataType::Object, false),
            function("flag", &[], DataType::Boolean, false),
        ];

        ValidatorConfig {
            preset_keywords: keywords,
            preset_functions: HashMap::from(functions.map(|f| (f.name.clone(), f))),
            ..ValidatorConfig::default()
        }
    }

    #[test]
    fn eval_arithmetic() {
        let config = ValidatorConfig::default();
        assert_eq!(eval_str("1 + 2 * (3 - 4) / 5", &config).data_type(), DataType::Numeric);
        assert_eq!(eval_str("-(2)", &config).data_type(), DataType::Numeric);
    }

    #[test]
    fn result_must_be_numeric() {
        let config = ValidatorConfig::default();
        let res = eval_str("1 < 2", &config);
        assert_eq!(
            res,
            DataObj::error("The expression return value must be numeric", -1)
        );
        assert!(eval_str("'a' + 'b'", &config).is_error());
    }

    #[test]
    fn unknown_identifier() {
        let msg = err_msg("x + 1", &ValidatorConfig::default());
        assert!(msg.starts_with("Identifier not found: x"), "{msg}");
    }

    #[test]
    fn skip_identifier_check() {
        let config = ValidatorConfig {
            not_check_ident: true,
            ..ValidatorConfig::default()
        };
        assert_eq!(eval_str("x + y", &config).data_type(), DataType::Numeric);
    }

    #[test]
    fn preset_keywords() {
        let config = catalog();
        assert_eq!(eval_str("IOT_DATA_TIME * 2", &config).data_type(), DataType::Numeric);
        assert!(err_msg("IOT_DATA + 1", &config).starts_with("Type mismatch: json + numeric"));
        assert!(err_msg("name - name", &config).starts_with("Unknown operator: string - string"));
    }

    #[test]
    fn type_mismatch() {
        let msg = err_msg("1 + 'a'", &ValidatorConfig::default());
        assert!(msg.starts_with("Type mismatch: numeric + string"), "{msg}");
    }

    #[test]
    fn equality_across_types() {
        let config = catalog();
        assert_eq!(
            eval_str("len(name == 1)", &config),
            DataObj::error(
                "string type parameter need, but get boolean type, please check position(8)",
                3
            )
        );
    }

    #[test]
    fn bang_is_type_level() {
        let config = catalog();
        assert!(err_msg("!online + 1", &config).starts_with("Type mismatch: boolean + numeric"));
        assert!(err_msg("-online", &config).starts_with("Unknown operator -boolean"));
    }

    fn eval_tree(src: &str, config: &ValidatorConfig) -> DataObj {
        let tokens: Vec<Token> = Lexer::new(src, &LexerConfig::default()).collect();
        let parser_config = ParserConfig::default();
        let ast = Parser::new(&tokens, &parser_config).parse().unwrap();
        Validator::new(config).eval(&ast)
    }

    #[test]
    fn bang_on_null_and_false() {
        let config = catalog();
        assert_eq!(
            eval_tree("!blob", &config),
            DataObj::Boolean {
                value: true,
                offset: 5
            }
        );
        assert_eq!(
            eval_tree("!(false)", &config),
            DataObj::Boolean {
                value: true,
                offset: 7
            }
        );
    }

    #[test]
    fn boolean_results_are_truthy() {
        let config = catalog();
        assert_eq!(
            eval_tree("!flag()", &config),
            DataObj::Boolean {
                value: false,
                offset: 5
            }
        );
        assert_eq!(
            eval_tree("!online", &config),
            DataObj::Boolean {
                value: false,
                offset: 7
            }
        );
    }

    #[test]
    fn call_arity() {
        let config = catalog();
        let msg = err_msg("sum(1)", &config);
        assert!(msg.starts_with("2 parameters need, but 1 found"), "{msg}");
        assert_eq!(eval_str("sum(1, 2)", &config).data_type(), DataType::Numeric);
    }

    #[test]
    fn call_argument_types() {
        let config = catalog();
        let msg = err_msg("len(1)", &config);
        assert!(msg.starts_with("string type parameter need, but get numeric type"), "{msg}");
        assert_eq!(eval_str("len(upper('abc')) + 1", &config).data_type(), DataType::Numeric);
    }

    #[test]
    fn variadic_call() {
        let config = catalog();
        assert_eq!(eval_str("max()", &config).data_type(), DataType::Numeric);
        assert_eq!(eval_str("max(1, 'a', online)", &config).data_type(), DataType::Numeric);
    }

    #[test]
    fn argument_errors_propagate() {
        let config = catalog();
        let msg = err_msg("max(1, missing, 2)", &config);
        assert!(msg.starts_with("Identifier not found: missing"), "{msg}");
    }

    #[test]
    fn unknown_function() {
        let msg = err_msg("avg(1)", &catalog());
        assert!(msg.starts_with("Function not found: avg"), "{msg}");
    }

    #[test]
    fn return_types() {
        let config = catalog();
        assert!(err_msg("parse('x') + 1", &config).starts_with("Type mismatch: json + numeric"));
        assert!(err_msg("raw()", &config).starts_with("Unsupported data type object"));
    }

    #[test]
    fn validation_is_idempotent() {
        let config = catalog();
        let tokens: Vec<Token> = Lexer::new("sum(IOT_DATA_TIME, 2) > 1", &LexerConfig::default()).collect();
        let parser_config = ParserConfig::default();
        let ast = Parser::new(&tokens, &parser_config).parse().unwrap();
        let first = Validator::new(&config).validate(&ast);
        let second = Validator::new(&config).validate(&ast);
        assert_eq!(first, second);
    }

    #[test]
    fn depth_limit() {
        let config = ValidatorConfig {
            max_depth: 4,
            ..ValidatorConfig::default()
        };
        let msg = err_msg("1 + 1 + 1 + 1 + 1", &config);
        assert!(msg.starts_with("Maximum nesting depth exceeded"), "{msg}");
    }
}
