use serde::Deserialize;

/// Envelope returned by `/advancedsearch.php?output=json`.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub response: SearchPage,
}

/// The `response` member of a search result.
#[derive(Debug, Deserialize)]
pub struct SearchPage {
    #[serde(rename = "numFound", default)]
    pub num_found: u64,
    #[serde(default)]
    pub docs: Vec<SearchDoc>,
}

/// One item summary from a search page.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchDoc {
    pub identifier: String,
    #[serde(default)]
    pub skintype: Option<String>,
}

/// Response from `/metadata/<identifier>`.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemMetadata {
    #[serde(default)]
    pub files: Vec<ItemFile>,
}

/// One file of an archive item. Derivative files (thumbnails, torrents)
/// may lack an md5.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemFile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub md5: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_response_deserialize() {
        let json = r#"{
            "responseHeader": {"status": 0, "QTime": 12},
            "response": {
                "numFound": 2,
                "start": 0,
                "docs": [
                    {"identifier": "winampskins_Sonic_AMP", "skintype": "wsz"},
                    {"identifier": "winampskins_base", "skintype": "wsz"}
                ]
            }
        }"#;
        let resp: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.response.num_found, 2);
        assert_eq!(resp.response.docs.len(), 2);
        assert_eq!(resp.response.docs[0].identifier, "winampskins_Sonic_AMP");
        assert_eq!(resp.response.docs[0].skintype.as_deref(), Some("wsz"));
    }

    #[test]
    fn test_search_doc_missing_skintype() {
        let json = r#"{"response": {"numFound": 1, "docs": [{"identifier": "winampskins_x"}]}}"#;
        let resp: SearchResponse = serde_json::from_str(json).unwrap();
        assert!(resp.response.docs[0].skintype.is_none());
    }

    #[test]
    fn test_item_metadata_deserialize() {
        let json = r#"{
            "created": 1600000000,
            "files": [
                {"name": "Sonic_AMP.wsz", "source": "original", "md5": "0f5bb235be145e9c22e79452a9f67ad9"},
                {"name": "Sonic_AMP.png", "md5": "d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1"},
                {"name": "__ia_thumb.jpg"}
            ]
        }"#;
        let metadata: ItemMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.files.len(), 3);
        assert_eq!(metadata.files[0].name, "Sonic_AMP.wsz");
        assert_eq!(
            metadata.files[0].md5.as_deref(),
            Some("0f5bb235be145e9c22e79452a9f67ad9")
        );
        assert!(metadata.files[2].md5.is_none());
    }

    #[test]
    fn test_item_metadata_empty() {
        let metadata: ItemMetadata = serde_json::from_str("{}").unwrap();
        assert!(metadata.files.is_empty());
    }
}
