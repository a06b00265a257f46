use std::io::BufRead;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
}

impl ObjectType {
    pub fn as_str(&self) -> &str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
        }
    }

    /// Consume the `<type> <len>\0` envelope header from a reader.
    ///
    /// The declared length is returned so callers can verify the remaining
    /// content matches it exactly.
    pub fn parse_header(reader: &mut impl BufRead) -> anyhow::Result<(ObjectType, usize)> {
        let mut object_type = Vec::new();
        reader.read_until(b' ', &mut object_type)?;
        if object_type.pop() != Some(b' ') {
            return Err(anyhow::anyhow!("Truncated object header"));
        }

        let mut len_bytes = Vec::new();
        reader.read_until(b'\0', &mut len_bytes)?;
        if len_bytes.pop() != Some(b'\0') {
            return Err(anyhow::anyhow!("Truncated object header"));
        }

        let object_type = ObjectType::try_from(std::str::from_utf8(&object_type)?)?;
        let len = std::str::from_utf8(&len_bytes)?
            .parse::<usize>()
            .map_err(|_| anyhow::anyhow!("Invalid object length in header"))?;

        Ok((object_type, len))
    }
}

impl TryFrom<&str> for ObjectType {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> anyhow::Result<Self> {
        match value {
            "blob" => Ok(ObjectType::Blob),
            "tree" => Ok(ObjectType::Tree),
            "commit" => Ok(ObjectType::Commit),
            _ => Err(anyhow::anyhow!("Invalid object type: {}", value)),
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
