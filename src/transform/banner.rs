// src/transform/banner.rs

use crate::context::BuildContext;
use crate::transform::{Artifact, TextTransform, TransformError};

/// Prepends a fixed header (the package banner) to each file.
#[derive(Debug, Clone)]
pub struct Banner {
    text: String,
}

impl Banner {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl TextTransform for Banner {
    fn id(&self) -> &str {
        "banner"
    }

    fn transform_text(
        &self,
        text: &str,
        _artifact: &Artifact,
        _ctx: &BuildContext,
    ) -> Result<String, TransformError> {
        let mut out = String::with_capacity(self.text.len() + text.len());
        out.push_str(&self.text);
        out.push_str(text);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use crate::transform::Transform;
    use std::path::PathBuf;
    use std::sync::Arc;

    #[tokio::test]
    async fn banner_goes_first() {
        let ctx = BuildContext::with_defaults(Arc::new(MockFileSystem::new()));
        let artifact = Artifact {
            source: PathBuf::from("./src/a.css"),
            relative: PathBuf::from("a.css"),
            contents: b"a{}".to_vec(),
        };
        let out = Banner::new("/** hi */\n").apply(artifact, &ctx).await.unwrap();
        assert_eq!(out.contents, b"/** hi */\na{}");
    }
}
