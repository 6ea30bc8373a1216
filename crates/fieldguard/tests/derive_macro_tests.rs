//! Integration tests for the Validated derive macro.
//!
//! These tests verify that the derive builds the expected schema and that
//! construction through `activate` checks, aggregates and reports causes.

use fieldguard::prelude::*;
use fieldguard::{Mode, Value};
use serde_json::json;

#[derive(Debug, Validated)]
struct Adult {
    #[validate(is_positive_number(min = 18))]
    age: i64,
}

#[derive(Debug, Validated)]
struct Contact {
    #[validate(is_email)]
    email: String,
}

#[derive(Debug, Validated)]
struct Flags {
    #[validate(is_boolean)]
    enabled: Value,
}

#[derive(Debug, Validated)]
#[validated(reporting)]
struct Phones {
    #[validate(is_phone)]
    any: String,

    #[validate(is_phone(minlen = 11, maxlen = 11))]
    fixed: String,
}

#[derive(Debug, Validated)]
struct Role {
    #[validate(is_member_of("ab", "ac", "ad"))]
    code: String,
}

#[derive(Debug, Validated)]
#[validated(throwable = false)]
struct Profile {
    #[validate(not_empty_string)]
    name: String,

    #[validate(is_number(min = 0, max = 120))]
    age: f64,
}

#[derive(Debug, Validated)]
struct Account {
    #[validate(required, message = "{requiredProperty}")]
    login: Option<String>,
}

#[derive(Debug, Validated)]
struct Code {
    #[validate(is_number)]
    #[validate(is_positive_number, message = "{codePositive}")]
    value: Value,
}

#[derive(Debug, Validated)]
#[validated(name = "User", group = "create")]
struct CreateUser {
    #[validate(required, group = "update")]
    id: Option<u64>,

    #[validate(required, group = "create")]
    #[validate(is_email, group = "create", group = "update")]
    email: Option<String>,

    #[validate(not_empty_string)]
    nickname: Option<String>,
}

#[derive(Debug, Validated)]
#[validated(schema = CreateUser, group = "update")]
struct UpdateUser(CreateUser);

#[derive(Debug, Validated)]
#[validated(schema = CreateUser)]
struct DefaultUser(CreateUser);

fn is_even(value: &Value) -> bool {
    value.as_i64().map_or(false, |n| n % 2 == 0)
}

#[derive(Debug, Validated)]
struct Pair {
    #[validate(custom(id = "IsEven", check = is_even), message = "{odd}")]
    left: i64,
}

#[derive(Debug, Validated)]
struct Reading {
    #[validate(not_empty)]
    level: f64,
}

#[derive(Debug, Validated)]
struct Gauge {
    #[validate(required)]
    level: f64,
}

#[derive(Debug, Validated)]
struct Badge {
    #[validate(required, message = "{need}")]
    id: Option<u64>,
}

#[derive(Debug, Validated)]
#[validated(schema = Badge)]
struct Reissued(Badge);

#[derive(Debug, Validated)]
#[validated(schema = Badge)]
struct Replacement(Badge);

fn adult(age: i64) -> Result<fieldguard::Sealed<Adult>, Error> {
    Adult::activate(|ctx| {
        Ok(Adult {
            age: ctx.set("age", age)?,
        })
    })
}

fn create_user<'a>(
    id: Option<u64>,
    email: Option<&'a str>,
    nickname: Option<&'a str>,
) -> impl FnOnce(&mut Construction<'_>) -> Result<CreateUser, Error> + 'a {
    move |ctx| {
        Ok(CreateUser {
            id: ctx.set("id", id)?,
            email: ctx.set("email", email.map(str::to_string))?,
            nickname: ctx.set("nickname", nickname.map(str::to_string))?,
        })
    }
}

#[test]
fn derive_builds_schema_in_declaration_order() {
    let schema = Code::schema();
    assert_eq!(schema.name(), "Code");

    let rules = schema.rules_for("value", &ValidationGroup::Default);
    let constraints: Vec<_> = rules.iter().map(|r| r.constraint()).collect();
    assert_eq!(constraints, vec!["IsNumber", "IsPositiveNumber"]);
    assert_eq!(rules[1].failure_message(), "{codePositive}");

    assert_eq!(CreateUser::schema().name(), "User");
    assert!(std::ptr::eq(UpdateUser::schema(), CreateUser::schema()));
}

#[test]
fn adult_age_example() {
    let err = adult(15).unwrap_err().into_invalid().unwrap();
    assert_eq!(err.len(), 1);
    assert_eq!(err.causes[0].constraint, "IsPositiveNumber");
    assert_eq!(err.causes[0].property, "age");
    assert_eq!(err.causes[0].value, json!(15));

    let ok = adult(21).unwrap();
    assert_eq!(ok.age, 21);
    assert!(ok.query_validation_errors().is_none());
}

#[test]
fn email_example() {
    let build = |email: &str| {
        Contact::activate(|ctx| {
            Ok(Contact {
                email: ctx.set("email", email.to_string())?,
            })
        })
    };

    let err = build("not-an-email").unwrap_err().into_invalid().unwrap();
    assert_eq!(err.constraints(), vec!["IsEmail"]);
    assert_eq!(err.message, "{IsEmail}");

    assert!(build("user@example.com").is_ok());
}

#[test]
fn boolean_rejects_numbers() {
    let err = Flags::activate(|ctx| {
        Ok(Flags {
            enabled: ctx.set_value("enabled", json!(1)),
        })
    })
    .unwrap_err()
    .into_invalid()
    .unwrap();
    assert_eq!(err.causes[0].constraint, "IsBoolean");

    let ok = Flags::activate(|ctx| {
        Ok(Flags {
            enabled: ctx.set_value("enabled", json!(true)),
        })
    });
    assert!(ok.is_ok());
}

#[test]
fn phone_default_and_fixed_length() {
    let sealed = Phones::activate(|ctx| {
        Ok(Phones {
            any: ctx.set("any", "+7921219212".to_string())?,
            fixed: ctx.set("fixed", "+7921219212".to_string())?,
        })
    })
    .unwrap();

    let causes = sealed.query_validation_errors().unwrap();
    assert_eq!(causes.len(), 1);
    assert_eq!(causes[0].property, "fixed");
    assert_eq!(causes[0].constraint, "IsPhone");

    let sealed = Phones::activate(|ctx| {
        Ok(Phones {
            any: ctx.set("any", "+7 (921) 219-92-12".to_string())?,
            fixed: ctx.set("fixed", "+79212192121".to_string())?,
        })
    })
    .unwrap();
    assert!(sealed.is_valid());
}

#[test]
fn membership() {
    let build = |code: &str| {
        Role::activate(|ctx| {
            Ok(Role {
                code: ctx.set("code", code.to_string())?,
            })
        })
    };

    assert!(build("ac").is_ok());
    let err = build("ae").unwrap_err().into_invalid().unwrap();
    assert_eq!(err.causes[0].constraint, "IsMemberOf");
    assert_eq!(err.causes[0].value, json!("ae"));
}

#[test]
fn reporting_mode_never_fails() {
    assert_eq!(Profile::activation().mode, Mode::Reporting);

    let sealed = Profile::activate(|ctx| {
        Ok(Profile {
            name: ctx.set("name", "   ".to_string())?,
            age: ctx.set("age", -1.0)?,
        })
    })
    .unwrap();

    assert_eq!(sealed.age, -1.0);
    let constraints: Vec<_> = sealed
        .query_validation_errors()
        .unwrap()
        .iter()
        .map(|c| c.constraint.as_str())
        .collect();
    assert_eq!(constraints, vec!["NotEmptyString", "IsNumber"]);

    let sealed = Profile::activate(|ctx| {
        Ok(Profile {
            name: ctx.set("name", "Ann".to_string())?,
            age: ctx.set("age", 0.0)?,
        })
    })
    .unwrap();
    assert!(sealed.query_validation_errors().is_none());
}

#[test]
fn installed_messages_resolve_required_placeholder() {
    Account::set_messages(MessageTable::new().with("requiredProperty", "TEST MESSAGE"));

    let err = Account::activate(|ctx| {
        Ok(Account {
            login: ctx.set("login", None::<String>)?,
        })
    })
    .unwrap_err()
    .into_invalid()
    .unwrap();
    assert_eq!(err.message, "TEST MESSAGE");
    assert_eq!(err.to_string(), "TEST MESSAGE");

    // A field never assigned is reported the same way.
    let err = Account::activate(|_| Ok(Account { login: None }))
        .unwrap_err()
        .into_invalid()
        .unwrap();
    assert_eq!(err.causes[0].property, "login");
    assert_eq!(err.message, "TEST MESSAGE");

    let explicit = MessageTable::new().with("requiredProperty", "login please");
    let err = Account::activate_with_messages(&explicit, |ctx| {
        Ok(Account {
            login: ctx.set("login", None::<String>)?,
        })
    })
    .unwrap_err()
    .into_invalid()
    .unwrap();
    assert_eq!(err.message, "login please");

    Account::clear_messages();
    assert!(Account::messages().is_none());
}

#[test]
fn stacked_rules_report_every_failure() {
    let err = Code::activate(|ctx| {
        Ok(Code {
            value: ctx.set_value("value", json!("abc")),
        })
    })
    .unwrap_err()
    .into_invalid()
    .unwrap();

    assert_eq!(err.len(), 2);
    assert_eq!(err.causes_for("value").count(), 2);
    assert_eq!(err.constraints(), vec!["IsNumber", "IsPositiveNumber"]);
    assert_eq!(err.message, "{IsNumber}");
}

#[test]
fn null_only_trips_required() {
    let ok = Code::activate(|ctx| {
        Ok(Code {
            value: ctx.set_value("value", Value::Null),
        })
    });
    assert!(ok.is_ok());
}

#[test]
fn groups_select_rules() {
    let err = CreateUser::activate(create_user(None, Some("bad"), None))
        .unwrap_err()
        .into_invalid()
        .unwrap();
    assert_eq!(err.constraints(), vec!["IsEmail"]);

    let err = CreateUser::activate(create_user(Some(1), None, None))
        .unwrap_err()
        .into_invalid()
        .unwrap();
    assert_eq!(err.constraints(), vec!["Required"]);
    assert_eq!(err.causes[0].property, "email");

    let err = UpdateUser::activate(|ctx| Ok(UpdateUser(create_user(None, Some("bad"), None)(ctx)?)))
        .unwrap_err()
        .into_invalid()
        .unwrap();
    assert_eq!(err.constraints(), vec!["Required", "IsEmail"]);
    assert_eq!(err.causes[0].property, "id");

    let ok = UpdateUser::activate(|ctx| Ok(UpdateUser(create_user(Some(7), None, Some(" "))(ctx)?)));
    assert_eq!(ok.unwrap().0.id, Some(7));
}

#[test]
fn default_group_only_runs_ungrouped_rules() {
    let err = DefaultUser::activate(|ctx| {
        Ok(DefaultUser(create_user(None, Some("bad"), Some(" "))(ctx)?))
    })
    .unwrap_err()
    .into_invalid()
    .unwrap();

    assert_eq!(err.constraints(), vec!["NotEmptyString"]);
    assert_eq!(err.causes[0].property, "nickname");
}

#[test]
fn custom_predicate_rule() {
    let build = |left: i64| {
        Pair::activate(|ctx| {
            Ok(Pair {
                left: ctx.set("left", left)?,
            })
        })
    };

    assert!(build(4).is_ok());
    let err = build(3).unwrap_err().into_invalid().unwrap();
    assert_eq!(err.causes[0].constraint, "IsEven");
    assert_eq!(err.message, "{odd}");
}

#[test]
fn absent_entity_is_not_presented() {
    let err = Adult::activate_present(None::<Value>, |entity, ctx| {
        Ok(Adult {
            age: ctx.take(&entity, "age").as_i64().unwrap_or_default(),
        })
    })
    .unwrap_err()
    .into_invalid()
    .unwrap();

    assert_eq!(err.constraints(), vec!["IsPresented"]);
    assert_eq!(err.causes[0].property, "Adult");

    let sealed = Adult::activate_present(Some(json!({"age": 30})), |entity, ctx| {
        Ok(Adult {
            age: ctx.take(&entity, "age").as_i64().unwrap_or_default(),
        })
    })
    .unwrap();
    assert_eq!(sealed.age, 30);
}

#[test]
fn identical_input_gives_identical_causes() {
    let first = adult(15).unwrap_err().into_invalid().unwrap();
    let second = adult(15).unwrap_err().into_invalid().unwrap();
    assert_eq!(first.causes, second.causes);
}

#[test]
fn aggregate_error_json_shape() {
    let err = adult(15).unwrap_err().into_invalid().unwrap();
    let json = serde_json::to_value(&err).unwrap();

    assert_eq!(json["error"]["type"], "validation_error");
    assert_eq!(json["error"]["message"], "{IsPositiveNumber}");
    assert_eq!(json["error"]["causes"][0]["property"], "age");
    assert_eq!(json["error"]["causes"][0]["value"], 15);
}

#[test]
fn nan_is_not_empty_but_is_present() {
    let err = Reading::activate(|ctx| {
        Ok(Reading {
            level: ctx.set("level", f64::NAN)?,
        })
    })
    .unwrap_err()
    .into_invalid()
    .unwrap();
    assert_eq!(err.constraints(), vec!["NotEmpty"]);
    assert_eq!(err.causes[0].value, Value::Null);

    let sealed = Gauge::activate(|ctx| {
        Ok(Gauge {
            level: ctx.set("level", f64::NAN)?,
        })
    })
    .unwrap();
    assert!(sealed.level.is_nan());
    assert!(sealed.query_validation_errors().is_none());
}

#[test]
fn shared_schema_falls_back_to_owner_messages() {
    Badge::set_messages(MessageTable::new().with("need", "id is needed"));

    let err = Reissued::activate(|ctx| {
        Ok(Reissued(Badge {
            id: ctx.set("id", None::<u64>)?,
        }))
    })
    .unwrap_err()
    .into_invalid()
    .unwrap();
    assert_eq!(err.message, "id is needed");

    // A table installed on the overriding type shadows the owner's.
    Replacement::set_messages(MessageTable::new().with("need", "replacement needs an id"));
    let err = Replacement::activate(|ctx| {
        Ok(Replacement(Badge {
            id: ctx.set("id", None::<u64>)?,
        }))
    })
    .unwrap_err()
    .into_invalid()
    .unwrap();
    assert_eq!(err.message, "replacement needs an id");
}

#[derive(Clone, Default)]
struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[test]
fn construction_logs_failed_constraints() {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("fieldguard=trace"))
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || adult(15));
    assert!(result.is_err());

    let logs = captured.text();
    assert!(logs.contains("constraint failed"), "{logs}");
    assert!(logs.contains("constraint=IsPositiveNumber"), "{logs}");
    assert!(logs.contains("construction has validation causes"), "{logs}");
}
