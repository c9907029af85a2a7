//! 名称编码的RPC协议
//!
//! 运算调用的名称为 `/<app-prefix>/<operation>/<x>/<y>`，
//! Worker就绪探测的名称为 `/<app-prefix>/worker/<id>/ready`。

use std::fmt;
use std::str::FromStr;

use crate::errors::{FlintError, FlintResult};
use crate::name::Name;

pub const WORKER_COMPONENT: &str = "worker";
pub const READY_COMPONENT: &str = "ready";
pub const READY_PAYLOAD: &str = "ready";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
}

impl Operation {
    pub fn token(&self) -> &'static str {
        match self {
            Operation::Add => "add",
        }
    }

    /// 加宽到 i128，任何操作数组合都不会溢出
    pub fn apply(&self, x: i64, y: i64) -> i128 {
        match self {
            Operation::Add => i128::from(x) + i128::from(y),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Operation {
    type Err = FlintError;

    fn from_str(s: &str) -> FlintResult<Self> {
        match s {
            "add" => Ok(Operation::Add),
            other => Err(FlintError::invalid_name(other, "未知的运算")),
        }
    }
}

/// 请求名称无法解码为操作数的原因，每种原因以固定的响应内容回复，而不是传输层错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandError {
    NotEnoughComponents,
    InvalidOperands,
}

impl OperandError {
    pub fn payload(&self) -> &'static str {
        match self {
            OperandError::NotEnoughComponents => "error: not enough components",
            OperandError::InvalidOperands => "error: invalid operands",
        }
    }
}

impl fmt::Display for OperandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.payload())
    }
}

pub fn app_prefix(prefix: &str) -> FlintResult<Name> {
    let name: Name = prefix.parse()?;
    if name.is_empty() {
        return Err(FlintError::invalid_name(prefix, "应用前缀为空"));
    }
    Ok(name)
}

pub fn operation_prefix(app_prefix: &Name, operation: Operation) -> FlintResult<Name> {
    app_prefix.append(operation.token())
}

pub fn operation_name(app_prefix: &Name, operation: Operation, x: i64, y: i64) -> FlintResult<Name> {
    operation_prefix(app_prefix, operation)?.append(x)?.append(y)
}

pub fn readiness_name(app_prefix: &Name, worker_id: u32) -> FlintResult<Name> {
    app_prefix
        .append(WORKER_COMPONENT)?
        .append(worker_id)?
        .append(READY_COMPONENT)
}

/// 解码入站请求的操作数
///
/// `name` 的最后一个组件是传输层的封装标记，先丢弃；
/// `operation_prefix` 之后的组件中，最后两个是操作数。
pub fn decode_operands(name: &Name, operation_prefix: &Name) -> Result<(i64, i64), OperandError> {
    let stripped = name.without_last();
    let trailing = stripped
        .suffix_after(operation_prefix)
        .unwrap_or_else(|| stripped.components());

    let n = trailing.len();
    if n < 2 {
        return Err(OperandError::NotEnoughComponents);
    }

    match (trailing[n - 2].parse::<i64>(), trailing[n - 1].parse::<i64>()) {
        (Ok(x), Ok(y)) => Ok((x, y)),
        _ => Err(OperandError::InvalidOperands),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix() -> Name {
        app_prefix("ndn-compute").unwrap()
    }

    #[test]
    fn test_operation_name_layout() {
        let name = operation_name(&prefix(), Operation::Add, 3, 5).unwrap();
        assert_eq!(name.to_string(), "/ndn-compute/add/3/5");
    }

    #[test]
    fn test_readiness_name_layout() {
        let name = readiness_name(&prefix(), 2).unwrap();
        assert_eq!(name.to_string(), "/ndn-compute/worker/2/ready");
    }

    #[test]
    fn test_operands_roundtrip_through_sealed_name() {
        let op_prefix = operation_prefix(&prefix(), Operation::Add).unwrap();
        for (x, y) in [(0, 0), (-7, 3), (i64::MIN, i64::MAX), (42, -42)] {
            let sealed = operation_name(&prefix(), Operation::Add, x, y)
                .unwrap()
                .append("params-sha256=00")
                .unwrap();
            assert_eq!(decode_operands(&sealed, &op_prefix), Ok((x, y)));
        }
    }

    #[test]
    fn test_too_few_operands() {
        let op_prefix = operation_prefix(&prefix(), Operation::Add).unwrap();
        let name: Name = "/ndn-compute/add/3/params-sha256=00".parse().unwrap();
        assert_eq!(
            decode_operands(&name, &op_prefix),
            Err(OperandError::NotEnoughComponents)
        );
        // without a sealing marker the last operand is taken for one
        let unsealed: Name = "/ndn-compute/add/3/5".parse().unwrap();
        assert_eq!(
            decode_operands(&unsealed, &op_prefix),
            Err(OperandError::NotEnoughComponents)
        );
    }

    #[test]
    fn test_non_numeric_operands() {
        let op_prefix = operation_prefix(&prefix(), Operation::Add).unwrap();
        let name: Name = "/ndn-compute/add/abc/5/params-sha256=00".parse().unwrap();
        assert_eq!(
            decode_operands(&name, &op_prefix),
            Err(OperandError::InvalidOperands)
        );
    }

    #[test]
    fn test_sum_does_not_overflow() {
        assert_eq!(
            Operation::Add.apply(i64::MAX, 1).to_string(),
            "9223372036854775808"
        );
    }

    #[test]
    fn test_operation_tokens() {
        assert_eq!("add".parse::<Operation>().unwrap(), Operation::Add);
        assert!("mul".parse::<Operation>().is_err());
    }

    #[test]
    fn test_empty_prefix_rejected() {
        assert!(app_prefix("/").is_err());
        assert!(app_prefix("a//b").is_err());
    }
}
