use crate::infra::{
    InMemoryApplicationStore, InMemoryPaymentStore, InMemoryTuitionStore, InMemoryUserStore,
    SandboxCheckoutGateway,
};
use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Map};
use std::sync::Arc;
use std::time::Duration;
use tutorhive::error::AppError;
use tutorhive::marketplace::applications::{
    ApplicationRecord, ApplicationRequest, ApplicationService, ReapplyScope,
};
use tutorhive::marketplace::payments::{
    CheckoutConfig, CheckoutInfo, PaymentService, ReconcileOutcome,
};
use tutorhive::marketplace::tuitions::{
    PosterIdentity, TuitionPosting, TuitionRecord, TuitionService, TuitionStatus,
};
use tutorhive::marketplace::users::{SignupDraft, SignupOutcome, UserService};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Monthly rate for the demo tuition in major currency units (defaults to 500)
    #[arg(long)]
    pub(crate) rate: Option<Decimal>,
    /// Skip the checkout and reconciliation portion of the demo
    #[arg(long)]
    pub(crate) skip_payment: bool,
}

/// Walks the full marketplace lifecycle against in-memory stores and the
/// sandbox processor: signup, posting, moderation, application, checkout,
/// and the idempotent reconciliation that settles it.
pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { rate, skip_payment } = args;
    let rate = rate.unwrap_or_else(|| Decimal::from(500));

    println!("Tuition marketplace demo");

    let tuitions = TuitionService::new(Arc::new(InMemoryTuitionStore::default()));
    let application_store = Arc::new(InMemoryApplicationStore::default());
    let applications =
        ApplicationService::new(application_store.clone(), ReapplyScope::AnyExisting);
    let gateway = Arc::new(SandboxCheckoutGateway::default());
    let payments = PaymentService::new(
        Arc::new(InMemoryPaymentStore::default()),
        application_store,
        gateway.clone(),
        CheckoutConfig {
            currency: "usd".to_string(),
            site_base_url: "http://localhost:5173".to_string(),
            processor_timeout: Duration::from_secs(2),
        },
    );
    let users = UserService::new(Arc::new(InMemoryUserStore::default()));

    println!("\nAccounts");
    let student = match users.create(student_draft()).await {
        Ok(SignupOutcome::Created(account)) | Ok(SignupOutcome::AlreadyRegistered(account)) => {
            account
        }
        Err(err) => {
            println!("  Signup rejected: {}", err);
            return Ok(());
        }
    };
    println!(
        "- Registered {} as {} ({})",
        student.name, student.role, student.id.0
    );

    let tutor = match users.create(tutor_draft()).await {
        Ok(SignupOutcome::Created(account)) | Ok(SignupOutcome::AlreadyRegistered(account)) => {
            account
        }
        Err(err) => {
            println!("  Signup rejected: {}", err);
            return Ok(());
        }
    };
    println!(
        "- Registered {} as {} ({})",
        tutor.name, tutor.role, tutor.id.0
    );

    match users.create(tutor_draft()).await {
        Ok(SignupOutcome::AlreadyRegistered(account)) => println!(
            "- Repeat signup for {} reused account {}",
            account.email, account.id.0
        ),
        Ok(SignupOutcome::Created(account)) => println!(
            "- Repeat signup unexpectedly created account {}",
            account.id.0
        ),
        Err(err) => println!("  Signup rejected: {}", err),
    }

    println!("\nTuition board");
    let tuition = match tuitions.create(demo_posting(&student.email, rate)).await {
        Ok(record) => record,
        Err(err) => {
            println!("  Posting rejected: {}", err);
            return Ok(());
        }
    };
    println!(
        "- {} posted {} (status {})",
        student.email,
        tuition.id.0,
        tuition.status.label()
    );

    let tuition = match tuitions.set_status(&tuition.id, TuitionStatus::Approved).await {
        Ok(record) => record,
        Err(err) => {
            println!("  Moderation failed: {}", err);
            return Ok(());
        }
    };
    println!("- Moderation approved {}", tuition.id.0);

    match tuitions.listings(Some(TuitionStatus::Approved)).await {
        Ok(listings) => println!(
            "- Public board lists {} approved posting(s); schedule and poster stay hidden",
            listings.len()
        ),
        Err(err) => println!("  Board unavailable: {}", err),
    }

    println!("\nApplications");
    let application = match applications
        .apply(application_request(&tuition, &tutor.email))
        .await
    {
        Ok(record) => record,
        Err(err) => {
            println!("  Application rejected: {}", err);
            return Ok(());
        }
    };
    println!(
        "- {} applied to {} -> {} ({})",
        tutor.email,
        tuition.id.0,
        application.id.0,
        application.status.label()
    );

    match applications
        .apply(application_request(&tuition, &tutor.email))
        .await
    {
        Err(err) => println!("- Second attempt blocked: {}", err),
        Ok(record) => println!("- Second attempt unexpectedly stored {}", record.id.0),
    }

    match applications.check_applied(&tutor.email, &tuition.id).await {
        Ok(applied) => println!("- Applied check for the pair reports {}", applied),
        Err(err) => println!("  Applied check unavailable: {}", err),
    }

    if skip_payment {
        return Ok(());
    }

    println!("\nSettlement");
    let handle = match payments
        .initiate_checkout(checkout_info(&tuition, &application, rate))
        .await
    {
        Ok(handle) => handle,
        Err(err) => {
            println!("  Checkout failed: {}", err);
            return Ok(());
        }
    };
    println!("- Opened checkout session {}", handle.session_id);
    println!("  Redirect: {}", handle.url);

    let transaction = match gateway.settle(&handle.session_id).await {
        Some(transaction) => transaction,
        None => {
            println!("  Sandbox session vanished before settlement");
            return Ok(());
        }
    };
    println!(
        "- Customer paid; processor issued transaction {}",
        transaction.0
    );

    match payments.reconcile(&handle.session_id).await {
        Ok(ReconcileOutcome::Reconciled { payment }) => println!(
            "- Reconciled session into payment {} ({} {})",
            payment.id.0, payment.amount, payment.currency
        ),
        Ok(other) => println!("- Unexpected reconcile outcome: {:?}", other),
        Err(err) => {
            println!("  Reconciliation failed: {}", err);
            return Ok(());
        }
    }

    match payments.reconcile(&handle.session_id).await {
        Ok(ReconcileOutcome::AlreadyReconciled { payment }) => println!(
            "- Repeat reconcile was a no-op; payment {} still {}",
            payment.id.0,
            payment.status.label()
        ),
        Ok(other) => println!("- Unexpected repeat outcome: {:?}", other),
        Err(err) => println!("  Reconciliation failed: {}", err),
    }

    match applications.get(&application.id).await {
        Ok(record) => println!(
            "- Application {} is now {}",
            record.id.0,
            record.status.label()
        ),
        Err(err) => println!("  Application lookup failed: {}", err),
    }

    match payments.list_by_student(&student.email).await {
        Ok(records) => println!(
            "- {} holds {} settled payment(s)",
            student.email,
            records.len()
        ),
        Err(err) => println!("  Payment lookup failed: {}", err),
    }

    Ok(())
}

fn student_draft() -> SignupDraft {
    SignupDraft {
        email: "ayesha@example.com".to_string(),
        name: "Ayesha Rahman".to_string(),
        role: "student".to_string(),
        profile: Map::new(),
    }
}

fn tutor_draft() -> SignupDraft {
    let mut profile = Map::new();
    profile.insert(
        "photo".to_string(),
        json!("https://cdn.example.com/raihan.jpg"),
    );
    profile.insert("about".to_string(), json!("Teaches secondary mathematics"));
    profile.insert("education".to_string(), json!("BSc, BUET"));

    SignupDraft {
        email: "raihan@example.com".to_string(),
        name: "Raihan Kabir".to_string(),
        role: "tutor".to_string(),
        profile,
    }
}

fn demo_posting(student_email: &str, rate: Decimal) -> TuitionPosting {
    let mut details = Map::new();
    details.insert("subject".to_string(), json!("Mathematics"));
    details.insert("class".to_string(), json!("8"));
    details.insert("salary".to_string(), json!(rate));
    details.insert("location".to_string(), json!("Mirpur, Dhaka"));

    TuitionPosting {
        posted_by: PosterIdentity {
            email: student_email.to_string(),
            name: Some("Ayesha Rahman".to_string()),
            details: Map::new(),
        },
        schedule: Some(json!({ "days": ["sat", "tue"], "time": "18:00" })),
        start_date: NaiveDate::from_ymd_opt(2026, 9, 1),
        details,
    }
}

fn application_request(tuition: &TuitionRecord, tutor_email: &str) -> ApplicationRequest {
    let mut details = Map::new();
    details.insert("qualification".to_string(), json!("BSc in Mathematics"));
    details.insert("expected_salary".to_string(), json!(500));

    ApplicationRequest {
        tuition_id: tuition.id.clone(),
        tutor_email: tutor_email.to_string(),
        student_email: tuition.posted_by.email.clone(),
        details,
    }
}

fn checkout_info(
    tuition: &TuitionRecord,
    application: &ApplicationRecord,
    rate: Decimal,
) -> CheckoutInfo {
    CheckoutInfo {
        tuition_id: tuition.id.clone(),
        application_id: application.id.clone(),
        tutor_email: application.tutor_email.clone(),
        student_email: tuition.posted_by.email.clone(),
        rate,
    }
}
