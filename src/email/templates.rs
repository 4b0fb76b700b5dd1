/// HTML bodies for the transactional emails. The verification template takes
/// the action URL and a display name; the reset template only needs the URL.

pub fn render_verification(
    site_name: &str,
    contact_address: &str,
    user_name: &str,
    url: &str,
) -> String {
    let greeting_name = if user_name.trim().is_empty() {
        "there"
    } else {
        user_name
    };
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <p style="font-weight: bold;">Hi {greeting_name},</p>
    <p>Thanks for starting the new {site_name} account! We want to make sure it's really you.
    Please click the button below to verify your email address.</p>
    <p><a href="{url}" style="display: inline-block; padding: 10px 20px; background: #000000; color: white; text-decoration: none; border-radius: 5px;">Verify Email</a></p>
    <hr style="border-color: #e6ebf1; margin: 20px 0;">
    <p style="color: #8898aa; font-size: 12px;">If you didn't request this email, you can safely ignore it.</p>
    <p style="color: #8898aa; font-size: 12px;">{site_name}, {contact_address}</p>
</body>
</html>"#
    )
}

pub fn render_password_reset(site_name: &str, url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>Password Reset</h2>
    <p>Click the link below to reset your {site_name} password:</p>
    <p><a href="{url}" style="display: inline-block; padding: 10px 20px; background: #000000; color: white; text-decoration: none; border-radius: 5px;">Reset Password</a></p>
    <p style="color: #666; font-size: 14px;">This link expires in 1 hour. If you didn't request this, you can ignore it.</p>
</body>
</html>"#
    )
}
