use crate::storage::model::{ResourceKind, ValidationError};

const INVALID_FILE_CHARS: &[char] = &['"', '/', '\\', ':', '|', '<', '>', '?', '*'];
const INVALID_BLOB_CHARS: &[char] = &['\\'];

/// 名称允许的字符集
#[derive(Debug, Clone, Copy)]
pub enum Charset {
    /// 除列出的字符外都可以
    Forbidden(&'static [char]),
    /// 只允许小写字母、数字和连字符
    LowercaseAlnumHyphen,
}

impl Charset {
    fn first_illegal(&self, name: &str) -> Option<char> {
        match self {
            Charset::Forbidden(chars) => name.chars().find(|c| chars.contains(c)),
            Charset::LowercaseAlnumHyphen => name
                .chars()
                .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')),
        }
    }

    fn describe(&self) -> String {
        match self {
            Charset::Forbidden(chars) => format!(
                "不能包含以下字符: {}",
                chars
                    .iter()
                    .map(|c| format!("'{}'", c))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Charset::LowercaseAlnumHyphen => "只能包含小写字母、数字和连字符".to_string(),
        }
    }
}

/// 某一资源类型的命名规则
#[derive(Debug, Clone, Copy)]
pub struct NameRules {
    pub min_len: usize,
    pub max_len: usize,
    pub charset: Charset,
    /// 名称按 `/` 分段（blob 的虚拟目录），每段都要检查
    pub segmented: bool,
}

impl NameRules {
    pub fn for_kind(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Directory | ResourceKind::File => NameRules {
                min_len: 1,
                max_len: 255,
                charset: Charset::Forbidden(INVALID_FILE_CHARS),
                segmented: false,
            },
            ResourceKind::FileShare | ResourceKind::Queue | ResourceKind::BlobContainer => {
                NameRules {
                    min_len: 3,
                    max_len: 63,
                    charset: Charset::LowercaseAlnumHyphen,
                    segmented: false,
                }
            }
            ResourceKind::Blob => NameRules {
                min_len: 1,
                max_len: 1024,
                charset: Charset::Forbidden(INVALID_BLOB_CHARS),
                segmented: true,
            },
        }
    }

    /// `.`、`..` 和空段在路径里无法寻址
    fn has_reserved_segment(&self, name: &str) -> bool {
        let reserved = |s: &str| s.is_empty() || s == "." || s == "..";
        if self.segmented {
            name.split('/').any(reserved)
        } else {
            reserved(name)
        }
    }

    fn describe_reserved(&self) -> &'static str {
        if self.segmented {
            "以 '/' 分隔的每一段都不能为空，也不能是 '.' 或 '..'"
        } else {
            "名称不能是 '.' 或 '..'"
        }
    }
}

/// 绑定到某一资源类型的校验器，提示框每次输入都会调用
#[derive(Debug, Clone, Copy)]
pub struct NameValidator {
    kind: ResourceKind,
    rules: NameRules,
}

impl NameValidator {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            rules: NameRules::for_kind(kind),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn check(&self, name: &str) -> Result<(), ValidationError> {
        validate_with(name, self.kind.noun(), &self.rules)
    }
}

/// 校验名称，按 空 -> 长度 -> 字符 -> 分段 的顺序报告第一个错误
pub fn validate(name: &str, kind: ResourceKind) -> Result<(), ValidationError> {
    validate_with(name, kind.noun(), &NameRules::for_kind(kind))
}

fn validate_with(name: &str, noun: &'static str, rules: &NameRules) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName { noun });
    }

    let len = name.chars().count();
    if len < rules.min_len || len > rules.max_len {
        return Err(ValidationError::LengthError {
            noun,
            min: rules.min_len,
            max: rules.max_len,
        });
    }

    if let Some(found) = rules.charset.first_illegal(name) {
        return Err(ValidationError::IllegalCharacter {
            noun,
            found,
            rule: rules.charset.describe(),
        });
    }

    if rules.has_reserved_segment(name) {
        return Err(ValidationError::ReservedName {
            noun,
            rule: rules.describe_reserved(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_is_rejected_for_every_kind() {
        for kind in ResourceKind::ALL {
            assert!(matches!(
                validate("", kind),
                Err(ValidationError::EmptyName { .. })
            ));
        }
    }

    #[test]
    fn directory_length_bounds() {
        assert!(validate(&"d".repeat(255), ResourceKind::Directory).is_ok());
        assert_eq!(
            validate(&"d".repeat(256), ResourceKind::Directory),
            Err(ValidationError::LengthError {
                noun: "directory",
                min: 1,
                max: 255
            })
        );
    }

    #[test]
    fn directory_forbidden_characters() {
        for ch in INVALID_FILE_CHARS {
            let name = format!("ab{}cd", ch);
            match validate(&name, ResourceKind::Directory) {
                Err(ValidationError::IllegalCharacter { found, .. }) => assert_eq!(found, *ch),
                other => panic!("{:?} 应被拒绝，得到 {:?}", name, other),
            }
        }
        assert!(validate("a b-c_d.e", ResourceKind::Directory).is_ok());
    }

    #[test]
    fn slash_in_directory_name_is_illegal() {
        assert!(matches!(
            validate("a/b", ResourceKind::Directory),
            Err(ValidationError::IllegalCharacter { found: '/', .. })
        ));
    }

    #[test]
    fn queue_rules_are_lowercase_alnum_and_hyphen() {
        assert!(validate("orders-2024", ResourceKind::Queue).is_ok());
        assert!(matches!(
            validate("Orders", ResourceKind::Queue),
            Err(ValidationError::IllegalCharacter { found: 'O', .. })
        ));
        assert!(matches!(
            validate("my_queue", ResourceKind::Queue),
            Err(ValidationError::IllegalCharacter { found: '_', .. })
        ));
        assert!(matches!(
            validate("ab", ResourceKind::Queue),
            Err(ValidationError::LengthError { min: 3, max: 63, .. })
        ));
    }

    #[test]
    fn blob_allows_slashes_but_not_backslashes() {
        assert!(validate("logs/2024/app.log", ResourceKind::Blob).is_ok());
        assert!(validate("logs\\app.log", ResourceKind::Blob).is_err());
    }

    #[test]
    fn dot_names_are_reserved_for_files_and_directories() {
        for kind in [ResourceKind::Directory, ResourceKind::File] {
            for name in [".", ".."] {
                assert!(matches!(
                    validate(name, kind),
                    Err(ValidationError::ReservedName { .. })
                ));
            }
        }
        assert!(validate("...", ResourceKind::Directory).is_ok());
        assert!(validate(".config", ResourceKind::File).is_ok());
        assert!(validate("my dir", ResourceKind::Directory).is_ok());
    }

    #[test]
    fn blob_segments_must_be_addressable() {
        for name in ["a//b", "/a", "a/", "./a", "a/../b", ".."] {
            assert!(
                matches!(
                    validate(name, ResourceKind::Blob),
                    Err(ValidationError::ReservedName { .. })
                ),
                "{:?} 应被拒绝",
                name
            );
        }
        assert!(validate("a/.b/c.txt", ResourceKind::Blob).is_ok());
    }

    #[test]
    fn validator_uses_rules_of_its_kind() {
        let validator = NameValidator::new(ResourceKind::Blob);
        assert!(validator.check("2024/cat.png").is_ok());
        assert_eq!(
            validator.check("a//b"),
            validate("a//b", ResourceKind::Blob)
        );
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        assert!(validate(&"目".repeat(255), ResourceKind::Directory).is_ok());
    }

    #[test]
    fn validator_is_bound_to_its_kind() {
        let validator = NameValidator::new(ResourceKind::FileShare);
        assert_eq!(validator.kind(), ResourceKind::FileShare);
        assert!(validator.check("docs").is_ok());
        assert!(validator.check("Docs").is_err());
    }
}
