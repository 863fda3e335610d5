//! Signup form demo: render, submit, and reject

use elif_forms::{
    CsrfValidator, DateValidator, DictValidator, EmailValidator, FormContext, FormError, FormOutcome,
    FormRequest, FormRules, IpAddressValidator, LengthValidator, ListValidator, MemorySession,
    PatternValidator, SelectValidator, SessionStore,
};
use http::Method;
use tracing_subscriber::EnvFilter;

fn signup_rules() -> Result<FormRules, Box<dyn std::error::Error>> {
    Ok(FormRules::new()
        .field("csrf", CsrfValidator::new())
        .field("username", PatternValidator::new("[a-z0-9_]{3,16}$")?)
        .field("email", EmailValidator::new())
        .field("password", LengthValidator::range(8, 64)?)
        .field("plan", SelectValidator::new(["free", "pro"])?)
        .field("born", DateValidator::iso().keep_object(true))
        .field("last_ip", IpAddressValidator::new())
        .field(
            "address",
            DictValidator::new()
                .field("city", LengthValidator::new().min(2))
                .field("zip", PatternValidator::new("[0-9]{5}$")?),
        )
        .field("tags", ListValidator::each(LengthValidator::new().max(12))))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("elif-forms Demo");
    println!("===============\n");

    let rules = signup_rules()?;
    let session = MemorySession::new();
    let ctx = FormContext::new(&session);

    // Demo 1: GET renders the form
    let outcome = rules.handle(&FormRequest::new(Method::GET), &ctx)?;
    if let FormOutcome::Render(scaffold) = outcome {
        println!("Scaffold:\n{}\n", serde_json::to_string_pretty(&scaffold)?);
    }
    let token = session.get("_csrf_token").unwrap_or_default();

    // Demo 2: a valid submission
    let body = format!(
        "csrf={}&username=sam_1&email=sam%40example.org&password=hunter2hunter2&plan=pro\
         &born=1990-02-03&last_ip=10.0.0.1&address.city=Oslo&address.zip=01234&tags%5B%5D=rust&tags%5B%5D=web",
        token
    );
    let request = FormRequest::new(Method::POST).with_urlencoded(body.as_bytes())?;
    match rules.handle(&request, &ctx)? {
        FormOutcome::Submitted(form) => {
            println!("Submitted:\n{}\n", serde_json::to_string_pretty(&form)?);
        }
        FormOutcome::Render(_) => println!("POST should not render"),
    }

    // Demo 3: the first failing field stops the request
    let request = FormRequest::new(Method::POST).with_pairs([
        ("csrf", token.as_str()),
        ("username", "Sam"),
        ("email", "sam"),
    ]);
    match rules.handle(&request, &ctx) {
        Err(FormError::Invalid(errors)) => {
            println!("Rejected:\n{}\n", serde_json::to_string_pretty(&errors.to_json())?);
        }
        other => println!("Unexpected outcome: {:?}", other),
    }

    // Demo 4: missing fields name the key
    let request = FormRequest::new(Method::POST).with_pairs([("csrf", token.as_str())]);
    match rules.handle(&request, &ctx) {
        Err(FormError::MissingField(missing)) => println!("Missing: {}", missing),
        other => println!("Unexpected outcome: {:?}", other),
    }

    println!("\nAll form demos completed");
    Ok(())
}
