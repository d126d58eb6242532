use emailjs_tools::{ContactMessage, EmailJsApi, EmailJsError};

#[allow(async_fn_in_trait)]
pub trait ContactMailer {
    /// Delivers a contact-form message, returning the provider's message id or status text.
    async fn send_contact_message(&self, message: ContactMessage) -> Result<String, EmailJsError>;
}

impl ContactMailer for EmailJsApi {
    async fn send_contact_message(&self, message: ContactMessage) -> Result<String, EmailJsError> {
        self.send(message).await
    }
}
