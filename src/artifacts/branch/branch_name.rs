use crate::artifacts::branch::INVALID_BRANCH_NAME_REGEX;
use crate::errors::RepoError;
use anyhow::Context;

/// Validated branch name.
///
/// Hierarchical names (`feature/login`) are allowed; names that would break
/// the reference file layout (leading dots, `..`, control characters,
/// `.lock` suffixes and similar) are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: String) -> anyhow::Result<Self> {
        if name.is_empty() {
            return Err(
                RepoError::InvalidArgument("branch name cannot be empty".to_string()).into(),
            );
        }

        let re = regex::Regex::new(INVALID_BRANCH_NAME_REGEX)
            .with_context(|| format!("invalid branch name regex: {INVALID_BRANCH_NAME_REGEX}"))?;

        if re.is_match(&name) {
            return Err(RepoError::InvalidArgument(format!("invalid branch name: {}", name)).into());
        }

        Ok(Self(name))
    }

    /// Full reference path under the control directory.
    pub fn as_ref_path(&self) -> String {
        format!("refs/heads/{}", self.0)
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::proptest;

    proptest! {
        #[test]
        fn accepts_alphanumeric_names(name in "[a-zA-Z0-9_-]+") {
            assert!(BranchName::try_parse(name).is_ok());
        }

        #[test]
        fn accepts_hierarchical_names(
            prefix in "[a-zA-Z0-9_-]+",
            suffix in "[a-zA-Z0-9_-]+"
        ) {
            assert!(BranchName::try_parse(format!("{}/{}", prefix, suffix)).is_ok());
        }

        #[test]
        fn rejects_leading_dot(suffix in "[a-zA-Z0-9_-]+") {
            assert!(BranchName::try_parse(format!(".{}", suffix)).is_err());
        }

        #[test]
        fn rejects_lock_suffix(prefix in "[a-zA-Z0-9_-]+") {
            assert!(BranchName::try_parse(format!("{}.lock", prefix)).is_err());
        }

        #[test]
        fn rejects_consecutive_dots(
            prefix in "[a-zA-Z0-9_-]+",
            suffix in "[a-zA-Z0-9_-]+"
        ) {
            assert!(BranchName::try_parse(format!("{}..{}", prefix, suffix)).is_err());
        }

        #[test]
        fn rejects_slash_boundaries(name in "[a-zA-Z0-9_-]+") {
            assert!(BranchName::try_parse(format!("/{}", name)).is_err());
            assert!(BranchName::try_parse(format!("{}/", name)).is_err());
        }

        #[test]
        fn rejects_special_characters(
            prefix in "[a-zA-Z0-9_-]+",
            suffix in "[a-zA-Z0-9_-]+",
            special in r"[\*:\?\[\\^~]"
        ) {
            assert!(BranchName::try_parse(format!("{}{}{}", prefix, special, suffix)).is_err());
        }
    }

    #[test]
    fn rejects_empty_name() {
        assert!(BranchName::try_parse(String::new()).is_err());
    }

    #[test]
    fn ref_path_lives_under_heads() {
        let name = BranchName::try_parse("feature/login".to_string()).unwrap();
        assert_eq!(name.as_ref_path(), "refs/heads/feature/login");
    }
}
