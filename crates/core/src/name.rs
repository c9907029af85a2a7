//! 层次化名称
//!
//! [`Name`] 是有序的字符串组件序列，文本形式以 `/` 分隔（`/ndn-compute/add/3/5`）。
//! 名称是值类型，所有“修改”操作都返回新的名称。

use std::fmt;
use std::str::FromStr;

use crate::errors::{FlintError, FlintResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name {
    components: Vec<String>,
}

impl Name {
    /// 空名称 `/`
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_components<I, S>(components: I) -> FlintResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let components: Vec<String> = components.into_iter().map(Into::into).collect();
        for component in &components {
            validate_component(component).map_err(|reason| {
                FlintError::invalid_name(format!("/{}", components.join("/")), reason)
            })?;
        }
        Ok(Self { components })
    }

    /// 返回追加了 `component` 的新名称
    pub fn append(&self, component: impl fmt::Display) -> FlintResult<Self> {
        let component = component.to_string();
        validate_component(&component).map_err(|reason| {
            FlintError::invalid_name(format!("{self}/{component}"), reason)
        })?;
        let mut components = self.components.clone();
        components.push(component);
        Ok(Self { components })
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.components.get(index).map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.components.last().map(String::as_str)
    }

    /// 前 `n` 个组件（`n` 超过长度时返回整个名称）
    pub fn prefix(&self, n: usize) -> Self {
        Self {
            components: self.components.iter().take(n).cloned().collect(),
        }
    }

    /// 去掉最后一个组件的名称
    pub fn without_last(&self) -> Self {
        self.prefix(self.len().saturating_sub(1))
    }

    pub fn is_prefix_of(&self, other: &Name) -> bool {
        self.len() <= other.len()
            && self
                .components
                .iter()
                .zip(other.components.iter())
                .all(|(a, b)| a == b)
    }

    /// `prefix` 是本名称的前缀时，返回其后的组件
    pub fn suffix_after(&self, prefix: &Name) -> Option<&[String]> {
        if prefix.is_prefix_of(self) {
            Some(&self.components[prefix.len()..])
        } else {
            None
        }
    }
}

fn validate_component(component: &str) -> Result<(), &'static str> {
    if component.is_empty() {
        return Err("名称组件为空");
    }
    if component.contains('/') {
        return Err("名称组件包含 '/'");
    }
    if component.chars().any(char::is_whitespace) {
        return Err("名称组件包含空白字符");
    }
    Ok(())
}

impl FromStr for Name {
    type Err = FlintError;

    fn from_str(s: &str) -> FlintResult<Self> {
        let trimmed = s.strip_prefix('/').unwrap_or(s);
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        Self::from_components(trimmed.split('/'))
            .map_err(|e| match e {
                FlintError::InvalidName { reason, .. } => FlintError::invalid_name(s, reason),
                other => other,
            })
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components.is_empty() {
            return f.write_str("/");
        }
        for component in &self.components {
            write!(f, "/{component}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let name: Name = "/ndn-compute/add/3/5".parse().unwrap();
        assert_eq!(name.len(), 4);
        assert_eq!(name.get(1), Some("add"));
        assert_eq!(name.to_string(), "/ndn-compute/add/3/5");

        let no_slash: Name = "ndn-compute/add".parse().unwrap();
        assert_eq!(no_slash.to_string(), "/ndn-compute/add");

        let trailing: Name = "/a/b/".parse().unwrap();
        assert_eq!(trailing.len(), 2);
    }

    #[test]
    fn test_root() {
        let root: Name = "/".parse().unwrap();
        assert!(root.is_empty());
        assert_eq!(root.to_string(), "/");
        assert_eq!(root, Name::root());
    }

    #[test]
    fn test_rejects_malformed() {
        assert!("/a//b".parse::<Name>().is_err());
        assert!("/a/b c".parse::<Name>().is_err());
        assert!(Name::root().append("").is_err());
        assert!(Name::root().append("x/y").is_err());
    }

    #[test]
    fn test_append_leaves_original_untouched() {
        let base: Name = "/app".parse().unwrap();
        let extended = base.append("add").unwrap().append(-3).unwrap();
        assert_eq!(base.to_string(), "/app");
        assert_eq!(extended.to_string(), "/app/add/-3");
    }

    #[test]
    fn test_prefix_relations() {
        let prefix: Name = "/app/add".parse().unwrap();
        let full: Name = "/app/add/1/2".parse().unwrap();
        assert!(prefix.is_prefix_of(&full));
        assert!(!full.is_prefix_of(&prefix));
        assert!(Name::root().is_prefix_of(&full));
        assert_eq!(
            full.suffix_after(&prefix).unwrap(),
            &["1".to_string(), "2".to_string()]
        );
        assert_eq!(full.without_last().to_string(), "/app/add/1");
        assert!(Name::root().without_last().is_empty());
    }
}
