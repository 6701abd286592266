//! File bundle assembly.

use crate::model::{Bundle, BundleMetadata, ExportDocument, ExtractedFile};
use chrono::{DateTime, SecondsFormat, Utc};

/// Bundle files with metadata stamped at the current time.
pub fn bundle(files: Vec<ExtractedFile>, platform_title: &str, url: &str) -> ExportDocument {
    bundle_with_date(files, platform_title, url, Utc::now())
}

/// Bundle files with an explicit export timestamp.
pub fn bundle_with_date(
    files: Vec<ExtractedFile>,
    platform_title: &str,
    url: &str,
    export_date: DateTime<Utc>,
) -> ExportDocument {
    let metadata = BundleMetadata {
        export_date: export_date.to_rfc3339_opts(SecondsFormat::Millis, true),
        platform_title: platform_title.to_string(),
        url: url.to_string(),
        file_count: files.len(),
        files: files.iter().map(ExtractedFile::summary).collect(),
    };
    log::debug!("bundled {} files", metadata.file_count);

    ExportDocument::Bundle(Bundle { files, metadata })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_bundle_metadata() {
        let date = Utc.with_ymd_and_hms(2025, 5, 6, 7, 8, 9).unwrap();
        let files = vec![
            ExtractedFile::text("a.md", "a.md", "md", "alpha"),
            ExtractedFile::text("b.json", "b.json", "json", "{}"),
        ];

        let ExportDocument::Bundle(bundle) =
            bundle_with_date(files, "Project X", "https://claude.ai/project/1", date)
        else {
            panic!("expected bundle");
        };

        assert_eq!(bundle.metadata.file_count, 2);
        assert_eq!(bundle.metadata.files[1].filename, "b.json");

        let json = bundle.metadata.to_json().unwrap();
        assert!(json.contains("\"exportDate\": \"2025-05-06T07:08:09.000Z\""));
        assert!(json.contains("\"originalName\": \"a.md\""));
    }
}
