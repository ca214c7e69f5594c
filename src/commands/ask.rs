use tracing::info;

use super::Host;

/// Send a message, with the staged document if there is one.
pub async fn send(host: &mut Host, text: &str) {
    let upload = host.staged.take();
    info!(
        chars = text.len(),
        attachment = upload.as_ref().map(|u| u.name.as_str()),
        "Message submitted"
    );
    println!("...");

    match host.session.submit(text, upload.clone()).await {
        Ok(reply) => println!("\nAI Assistant: {}\n", reply.text),
        Err(err) => {
            println!("! {}", err.error.notice());
            if let Some(advisory) = &err.advisory {
                println!("! {}", advisory);
            }
            // Keep the document staged so the message can be retried.
            if upload.is_some() {
                host.staged = upload;
            }
        }
    }
}
