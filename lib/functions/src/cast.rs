use oxrdf::NamedNode;
use oxrdf::vocab::xsd;
use oxsdatatypes::{Boolean, Decimal, Double, Integer};
use sparq_model::{Literal, Numeric, ThinError, ThinResult};
use std::str::FromStr;

/// `CAST(arg AS target)` (§4.2 operator list, §9 "Cast operator error cases" — the
/// source `abort()`s on some fatal default branches; here every unsupported
/// combination is simply a [`ThinError`]). Follows the SPARQL 1.1 §17.4.1.6
/// constructor-function casting rules: numeric literals cast to each other via value,
/// everything else casts via its lexical form.
pub fn cast(target: &NamedNode, arg: &Literal) -> ThinResult<Literal> {
    match target.as_str() {
        s if s == xsd::STRING.as_str() => Ok(Literal::plain(arg.lexical_form())),
        s if s == xsd::BOOLEAN.as_str() => cast_boolean(arg),
        s if s == xsd::INTEGER.as_str() => cast_integer(arg),
        s if s == xsd::DECIMAL.as_str() => cast_decimal(arg),
        s if s == xsd::DOUBLE.as_str() || s == xsd::FLOAT.as_str() => cast_double(arg),
        s if s == xsd::DATE_TIME.as_str() => cast_datetime(arg),
        _ => ThinError::expected(),
    }
}

fn cast_boolean(arg: &Literal) -> ThinResult<Literal> {
    let value = match arg {
        Literal::Boolean(b) => *b,
        Literal::Integer(i) => Boolean::from(*i != Integer::from(0_i64)),
        Literal::Decimal(d) => Boolean::from(*d != Decimal::from(0_i64)),
        Literal::Double(d) => {
            let v = f64::from(*d);
            Boolean::from(v != 0.0 && !v.is_nan())
        }
        Literal::PlainString(s, None) | Literal::TypedString(s, _) => match s.as_ref() {
            "true" | "1" => Boolean::from(true),
            "false" | "0" => Boolean::from(false),
            _ => return ThinError::expected(),
        },
        _ => return ThinError::expected(),
    };
    Ok(Literal::Boolean(value))
}

fn cast_integer(arg: &Literal) -> ThinResult<Literal> {
    let value = match Numeric::from_literal(arg) {
        Ok(Numeric::Integer(i)) => i,
        Ok(Numeric::Decimal(d)) => Integer::try_from(d).map_err(|_| ThinError)?,
        Ok(Numeric::Double(d)) => Integer::try_from(d).map_err(|_| ThinError)?,
        Err(_) => match arg {
            Literal::Boolean(b) => Integer::from(i64::from(bool::from(*b))),
            Literal::PlainString(s, None) | Literal::TypedString(s, _) => {
                Integer::from_str(s).map_err(|_| ThinError)?
            }
            _ => return ThinError::expected(),
        },
    };
    Ok(Literal::Integer(value))
}

fn cast_decimal(arg: &Literal) -> ThinResult<Literal> {
    let value = match Numeric::from_literal(arg) {
        Ok(Numeric::Integer(i)) => Decimal::from(i),
        Ok(Numeric::Decimal(d)) => d,
        Ok(Numeric::Double(d)) => Decimal::try_from(d).map_err(|_| ThinError)?,
        Err(_) => match arg {
            Literal::Boolean(b) => Decimal::from(i64::from(bool::from(*b))),
            Literal::PlainString(s, None) | Literal::TypedString(s, _) => {
                Decimal::from_str(s).map_err(|_| ThinError)?
            }
            _ => return ThinError::expected(),
        },
    };
    Ok(Literal::Decimal(value))
}

fn cast_double(arg: &Literal) -> ThinResult<Literal> {
    let value = match Numeric::from_literal(arg) {
        Ok(Numeric::Integer(i)) => Double::from(i),
        Ok(Numeric::Decimal(d)) => Double::from(d),
        Ok(Numeric::Double(d)) => d,
        Err(_) => match arg {
            Literal::Boolean(b) => Double::from(f64::from(bool::from(*b))),
            Literal::PlainString(s, None) | Literal::TypedString(s, _) => {
                Double::from_str(s).map_err(|_| ThinError)?
            }
            _ => return ThinError::expected(),
        },
    };
    Ok(Literal::Double(value))
}

fn cast_datetime(arg: &Literal) -> ThinResult<Literal> {
    match arg {
        Literal::DateTime(d) => Ok(Literal::DateTime(*d)),
        Literal::PlainString(s, None) | Literal::TypedString(s, _) => {
            sparq_model::DateTime::from_str(s)
                .map(Literal::DateTime)
                .map_err(|_| ThinError)
        }
        _ => ThinError::expected(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::vocab::xsd;

    #[test]
    fn string_to_integer() {
        let out = cast(&xsd::INTEGER.into_owned(), &Literal::plain("42")).unwrap();
        assert_eq!(out, Literal::Integer(42.into()));
    }

    #[test]
    fn boolean_to_integer() {
        let out = cast(&xsd::INTEGER.into_owned(), &Literal::Boolean(true.into())).unwrap();
        assert_eq!(out, Literal::Integer(1.into()));
    }

    #[test]
    fn invalid_lexical_form_errors() {
        assert!(cast(&xsd::INTEGER.into_owned(), &Literal::plain("abc")).is_err());
    }
}
