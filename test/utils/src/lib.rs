/// Analysis reply for a two clause contract, in the order the backend ranks
/// them.
pub fn analysis_fixture() -> &'static str {
    return r#"
{
    "document_id": "d1",
    "redline_document_id": "r1",
    "suggestions": [
        {
            "original": "Term: 1 year",
            "suggestion": "Term: 2 years"
        },
        {
            "original": "Governing law: NY",
            "suggestion": "Governing law: CH"
        }
    ]
}
"#
    .trim();
}

/// Analysis reply produced after feedback on clause 3.
pub fn reanalysis_fixture() -> &'static str {
    return r#"
{
    "document_id": "d1",
    "suggestions": [
        {
            "original": "Clause 3: X",
            "suggestion": "Clause 3: Y"
        }
    ]
}
"#
    .trim();
}

/// Stand-in for the bytes of a Word document. Only the zip magic is real.
pub fn docx_fixture() -> Vec<u8> {
    let mut bytes = vec![0x50, 0x4b, 0x03, 0x04];
    bytes.extend_from_slice(b"word/document.xml");
    return bytes;
}
