use matricula_docx::StyledDocument;

use crate::{CertificateError, CertificateFields, Substitution, SubstitutionStrategy};

/// Fill `template` (a `.docx`) with `fields` and return the finished document.
///
/// Any load or serialization failure aborts the whole call; no partial document is returned.
pub fn generate(
    template: &[u8],
    fields: &CertificateFields,
    strategy: &SubstitutionStrategy,
) -> Result<Vec<u8>, CertificateError> {
    let substitution = Substitution::new(strategy)?;
    let mut document = StyledDocument::from_bytes(template)?;
    let rewritten = substitution.apply(&mut document, fields);
    if rewritten == 0 {
        log::warn!("template has no recognizable placeholders; output equals the template");
    }
    Ok(document.to_bytes()?)
}
