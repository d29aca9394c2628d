use actix_multipart::form::{MultipartForm, tempfile::TempFile};

#[derive(MultipartForm)]
/// Multipart body of `PATCH /users/avatar`.
pub struct UploadAvatarForm {
    #[multipart(limit = "5MB")]
    pub file: TempFile,
}
