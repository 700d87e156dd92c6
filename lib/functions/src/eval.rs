use crate::context::{EvaluationContext, ExistsMode};
use crate::expr::Expression;
use crate::hashing;
use crate::langmatches::lang_matches;
use sparq_model::{Bindings, Literal, Numeric, NumericPair, ThinError, ThinResult, checked_numeric_op};
use std::sync::Arc;

/// Reduces `expr` to a literal or an expected-evaluation-error (§4.2). Never panics,
/// never logs — callers decide how to surface a `ThinError` (Filter drops the row,
/// Project leaves the cell unbound, OrderBy sorts errored keys first; §7).
pub fn evaluate(
    expr: &Expression,
    bindings: &Arc<Bindings>,
    ctx: &EvaluationContext<'_>,
) -> ThinResult<Literal> {
    match expr {
        // `BOUND` is the only operator that must see the raw `Literal::Variable`
        // instead of the value it's bound to — it is special-cased at the node level,
        // so there is nothing to unwrap here at all (§4.2 flattening invariant).
        Expression::Bound(offset) => Ok(Literal::Boolean(bindings.get(*offset).is_some().into())),

        Expression::Literal(lit) => flatten(lit, bindings),

        Expression::And(l, r) => eval_and(l, r, bindings, ctx),
        Expression::Or(l, r) => eval_or(l, r, bindings, ctx),
        Expression::Not(e) => {
            let v = eval_bool(e, bindings, ctx)?;
            Ok(Literal::Boolean((!v).into()))
        }

        Expression::Equal(l, r) => eval_cmp(l, r, bindings, ctx, |o| o == std::cmp::Ordering::Equal),
        Expression::NotEqual(l, r) => eval_cmp(l, r, bindings, ctx, |o| o != std::cmp::Ordering::Equal),
        Expression::Less(l, r) => eval_cmp(l, r, bindings, ctx, |o| o == std::cmp::Ordering::Less),
        Expression::LessOrEqual(l, r) => eval_cmp(l, r, bindings, ctx, |o| o != std::cmp::Ordering::Greater),
        Expression::Greater(l, r) => eval_cmp(l, r, bindings, ctx, |o| o == std::cmp::Ordering::Greater),
        Expression::GreaterOrEqual(l, r) => eval_cmp(l, r, bindings, ctx, |o| o != std::cmp::Ordering::Less),

        Expression::SameTerm(l, r) => {
            let l = evaluate(l, bindings, ctx)?;
            let r = evaluate(r, bindings, ctx)?;
            Ok(Literal::Boolean(l.same_term(&r).into()))
        }

        Expression::In(needle, haystack) => eval_in(needle, haystack, bindings, ctx, false),
        Expression::NotIn(needle, haystack) => eval_in(needle, haystack, bindings, ctx, true),

        Expression::UnaryPlus(e) => {
            let v = evaluate(e, bindings, ctx)?;
            Numeric::from_literal(&v)?;
            Ok(v)
        }
        Expression::UnaryMinus(e) => {
            let v = evaluate(e, bindings, ctx)?;
            match Numeric::from_literal(&v)? {
                Numeric::Integer(i) => Ok(Literal::Integer(i.checked_neg().ok_or(ThinError)?)),
                Numeric::Decimal(d) => Ok(Literal::Decimal(d.checked_neg().ok_or(ThinError)?)),
                Numeric::Double(d) => Ok(Literal::Double(-d)),
            }
        }
        Expression::Add(l, r) => eval_arith(l, r, bindings, ctx, |a, b| a.checked_add(b), |a, b| a.checked_add(b), |a, b| a + b),
        Expression::Subtract(l, r) => eval_arith(l, r, bindings, ctx, |a, b| a.checked_sub(b), |a, b| a.checked_sub(b), |a, b| a - b),
        Expression::Multiply(l, r) => eval_arith(l, r, bindings, ctx, |a, b| a.checked_mul(b), |a, b| a.checked_mul(b), |a, b| a * b),
        Expression::Divide(l, r) => {
            let l = evaluate(l, bindings, ctx)?;
            let r = evaluate(r, bindings, ctx)?;
            checked_numeric_op(
                &l,
                &r,
                |a, b| a.checked_div(b),
                |a, b| a.checked_div(b),
                |a, b| a / b,
            )
        }
        Expression::Abs(e) => match Numeric::from_literal(&evaluate(e, bindings, ctx)?)? {
            Numeric::Integer(i) => Ok(Literal::Integer(i.checked_abs().ok_or(ThinError)?)),
            Numeric::Decimal(d) => Ok(Literal::Decimal(d.checked_abs().ok_or(ThinError)?)),
            Numeric::Double(d) => Ok(Literal::Double(d.abs())),
        },
        Expression::Ceil(e) => match Numeric::from_literal(&evaluate(e, bindings, ctx)?)? {
            Numeric::Integer(i) => Ok(Literal::Integer(i)),
            Numeric::Decimal(d) => Ok(Literal::Decimal(d.ceil())),
            Numeric::Double(d) => Ok(Literal::Double(d.ceil())),
        },
        Expression::Floor(e) => match Numeric::from_literal(&evaluate(e, bindings, ctx)?)? {
            Numeric::Integer(i) => Ok(Literal::Integer(i)),
            Numeric::Decimal(d) => Ok(Literal::Decimal(d.floor())),
            Numeric::Double(d) => Ok(Literal::Double(d.floor())),
        },
        Expression::Round(e) => match Numeric::from_literal(&evaluate(e, bindings, ctx)?)? {
            Numeric::Integer(i) => Ok(Literal::Integer(i)),
            Numeric::Decimal(d) => Ok(Literal::Decimal(d.round())),
            Numeric::Double(d) => Ok(Literal::Double(d.round())),
        },
        Expression::Rand => Ok(Literal::Double(ctx.next_f64().into())),

        Expression::If(cond, yes, no) => {
            if eval_bool(cond, bindings, ctx)? {
                evaluate(yes, bindings, ctx)
            } else {
                evaluate(no, bindings, ctx)
            }
        }
        Expression::Coalesce(options) => {
            for option in options {
                if let Ok(v) = evaluate(option, bindings, ctx) {
                    return Ok(v);
                }
            }
            ThinError::expected()
        }

        Expression::Str(e) => {
            let v = evaluate(e, bindings, ctx)?;
            Ok(Literal::plain(v.lexical_form()))
        }
        Expression::Lang(e) => {
            let v = evaluate(e, bindings, ctx)?;
            match v {
                Literal::PlainString(_, Some(lang)) => Ok(Literal::plain(lang)),
                Literal::PlainString(_, None) | Literal::TypedString(_, _) => {
                    Ok(Literal::plain(""))
                }
                _ => ThinError::expected(),
            }
        }
        Expression::LangMatches(tag, range) => {
            let (tag, _) = string_value(&evaluate(tag, bindings, ctx)?)?;
            let (range, _) = string_value(&evaluate(range, bindings, ctx)?)?;
            Ok(Literal::Boolean(lang_matches(&tag, &range).into()))
        }
        Expression::Datatype(e) => {
            let v = evaluate(e, bindings, ctx)?;
            v.datatype_iri().map(Literal::Uri).ok_or(ThinError)
        }
        Expression::Bnode(None) => Ok(Literal::Blank(sparq_model::BlankNode::default())),
        Expression::Bnode(Some(e)) => {
            let (v, _) = string_value(&evaluate(e, bindings, ctx)?)?;
            sparq_model::BlankNode::new(v.to_string())
                .map(Literal::Blank)
                .map_err(ThinError::from)
        }
        Expression::Iri(e) => {
            let v = evaluate(e, bindings, ctx)?;
            let (lexical, _) = string_value(&v)?;
            resolve_iri(ctx, &lexical)
        }
        Expression::StrDt(value, datatype) => {
            let (value, _) = string_value(&evaluate(value, bindings, ctx)?)?;
            let datatype = evaluate(datatype, bindings, ctx)?;
            match datatype {
                Literal::Uri(dt) => Ok(Literal::TypedString(value, dt)),
                _ => ThinError::expected(),
            }
        }
        Expression::StrLang(value, lang) => {
            let (value, _) = string_value(&evaluate(value, bindings, ctx)?)?;
            let (lang, _) = string_value(&evaluate(lang, bindings, ctx)?)?;
            Ok(Literal::plain_with_language(value, lang))
        }

        Expression::StrLen(e) => {
            let (v, _) = string_value(&evaluate(e, bindings, ctx)?)?;
            Ok(Literal::Integer((v.chars().count() as i64).into()))
        }
        Expression::UCase(e) => {
            let (v, lang) = string_value(&evaluate(e, bindings, ctx)?)?;
            Ok(plain_or_lang(v.to_uppercase().into(), lang))
        }
        Expression::LCase(e) => {
            let (v, lang) = string_value(&evaluate(e, bindings, ctx)?)?;
            Ok(plain_or_lang(v.to_lowercase().into(), lang))
        }
        Expression::Concat(parts) => {
            let mut out = String::new();
            for part in parts {
                let (v, _) = string_value(&evaluate(part, bindings, ctx)?)?;
                out.push_str(&v);
            }
            Ok(Literal::plain(out))
        }
        Expression::SubStr {
            source,
            starting_loc,
            length,
        } => {
            let (v, lang) = string_value(&evaluate(source, bindings, ctx)?)?;
            let start = numeric_as_i64(&evaluate(starting_loc, bindings, ctx)?)?;
            let chars: Vec<char> = v.chars().collect();
            let start_idx = (start - 1).max(0) as usize;
            let end_idx = match length {
                Some(length) => {
                    let len = numeric_as_i64(&evaluate(length, bindings, ctx)?)?;
                    (start_idx as i64 + len.max(0)).clamp(0, chars.len() as i64) as usize
                }
                None => chars.len(),
            };
            let start_idx = start_idx.min(chars.len());
            let end_idx = end_idx.max(start_idx).min(chars.len());
            let result: String = chars[start_idx..end_idx].iter().collect();
            Ok(plain_or_lang(result.into(), lang))
        }
        Expression::Replace {
            arg,
            pattern,
            replacement,
            flags,
        } => {
            let (v, lang) = string_value(&evaluate(arg, bindings, ctx)?)?;
            let (pattern, _) = string_value(&evaluate(pattern, bindings, ctx)?)?;
            let (replacement, _) = string_value(&evaluate(replacement, bindings, ctx)?)?;
            let flags = match flags {
                Some(flags) => Some(string_value(&evaluate(flags, bindings, ctx)?)?.0),
                None => None,
            };
            let regex = compile_regex(&pattern, flags.as_deref())?;
            let result = regex.replace_all(&v, replacement.as_ref());
            Ok(plain_or_lang(result.into_owned().into(), lang))
        }
        Expression::Regex {
            text,
            pattern,
            flags,
        } => {
            let (v, _) = string_value(&evaluate(text, bindings, ctx)?)?;
            let (pattern, _) = string_value(&evaluate(pattern, bindings, ctx)?)?;
            let flags = match flags {
                Some(flags) => Some(string_value(&evaluate(flags, bindings, ctx)?)?.0),
                None => None,
            };
            let regex = compile_regex(&pattern, flags.as_deref())?;
            Ok(Literal::Boolean(regex.is_match(&v).into()))
        }
        Expression::Contains(haystack, needle) => {
            let (h, _) = string_value(&evaluate(haystack, bindings, ctx)?)?;
            let (n, _) = string_value(&evaluate(needle, bindings, ctx)?)?;
            Ok(Literal::Boolean(h.contains(n.as_ref()).into()))
        }
        Expression::StrStarts(haystack, needle) => {
            let (h, _) = string_value(&evaluate(haystack, bindings, ctx)?)?;
            let (n, _) = string_value(&evaluate(needle, bindings, ctx)?)?;
            Ok(Literal::Boolean(h.starts_with(n.as_ref()).into()))
        }
        Expression::StrEnds(haystack, needle) => {
            let (h, _) = string_value(&evaluate(haystack, bindings, ctx)?)?;
            let (n, _) = string_value(&evaluate(needle, bindings, ctx)?)?;
            Ok(Literal::Boolean(h.ends_with(n.as_ref()).into()))
        }
        Expression::StrBefore(haystack, needle) => {
            let (h, lang) = string_value(&evaluate(haystack, bindings, ctx)?)?;
            let (n, _) = string_value(&evaluate(needle, bindings, ctx)?)?;
            match h.find(n.as_ref()) {
                Some(pos) => Ok(plain_or_lang(h[..pos].to_string().into(), lang)),
                None => Ok(Literal::plain("")),
            }
        }
        Expression::StrAfter(haystack, needle) => {
            let (h, lang) = string_value(&evaluate(haystack, bindings, ctx)?)?;
            let (n, _) = string_value(&evaluate(needle, bindings, ctx)?)?;
            match h.find(n.as_ref()) {
                Some(pos) => Ok(plain_or_lang(h[pos + n.len()..].to_string().into(), lang)),
                None => Ok(Literal::plain("")),
            }
        }
        Expression::EncodeForUri(e) => {
            let (v, _) = string_value(&evaluate(e, bindings, ctx)?)?;
            Ok(Literal::plain(percent_encode(&v)))
        }

        Expression::Year(e) => date_part(e, bindings, ctx, |d| d.year() as i64),
        Expression::Month(e) => date_part(e, bindings, ctx, |d| d.month() as i64),
        Expression::Day(e) => date_part(e, bindings, ctx, |d| d.day() as i64),
        Expression::Hours(e) => date_part(e, bindings, ctx, |d| d.hour() as i64),
        Expression::Minutes(e) => date_part(e, bindings, ctx, |d| d.minute() as i64),
        Expression::Seconds(e) => {
            let v = evaluate(e, bindings, ctx)?;
            match v {
                Literal::DateTime(d) => Ok(Literal::Decimal(d.second())),
                _ => ThinError::expected(),
            }
        }
        Expression::Timezone(e) => {
            let v = evaluate(e, bindings, ctx)?;
            match v {
                Literal::DateTime(d) => d
                    .timezone_offset()
                    .map(|tz| {
                        Literal::typed(tz.to_string(), oxrdf::vocab::xsd::DAY_TIME_DURATION.into_owned())
                    })
                    .ok_or(ThinError),
                _ => ThinError::expected(),
            }
        }
        Expression::Tz(e) => {
            let v = evaluate(e, bindings, ctx)?;
            match v {
                Literal::DateTime(d) => Ok(Literal::plain(
                    d.timezone_offset()
                        .map(|tz| tz.to_string())
                        .unwrap_or_default(),
                )),
                _ => ThinError::expected(),
            }
        }
        Expression::Now => Ok(Literal::DateTime(ctx.now())),

        Expression::Uuid => Ok(Literal::Uri(
            sparq_model::NamedNode::new(format!("urn:uuid:{}", fresh_uuid(ctx))).map_err(ThinError::from)?,
        )),
        Expression::StrUuid => Ok(Literal::plain(fresh_uuid(ctx))),

        Expression::Md5(e) => hash_of(e, bindings, ctx, hashing::md5_hex),
        Expression::Sha1(e) => hash_of(e, bindings, ctx, hashing::sha1_hex),
        Expression::Sha256(e) => hash_of(e, bindings, ctx, hashing::sha256_hex),
        Expression::Sha384(e) => hash_of(e, bindings, ctx, hashing::sha384_hex),
        Expression::Sha512(e) => hash_of(e, bindings, ctx, hashing::sha512_hex),

        Expression::IsIri(e) => Ok(Literal::Boolean(
            matches!(evaluate(e, bindings, ctx)?, Literal::Uri(_)).into(),
        )),
        Expression::IsBlank(e) => Ok(Literal::Boolean(
            matches!(evaluate(e, bindings, ctx)?, Literal::Blank(_)).into(),
        )),
        Expression::IsLiteral(e) => Ok(Literal::Boolean(
            matches!(
                evaluate(e, bindings, ctx)?,
                Literal::PlainString(_, _)
                    | Literal::TypedString(_, _)
                    | Literal::Integer(_)
                    | Literal::Decimal(_)
                    | Literal::Double(_)
                    | Literal::Boolean(_)
                    | Literal::DateTime(_)
            )
            .into(),
        )),
        Expression::IsNumeric(e) => Ok(Literal::Boolean(
            Numeric::from_literal(&evaluate(e, bindings, ctx)?).is_ok().into(),
        )),

        Expression::Cast { target, arg } => crate::cast::cast(target, &evaluate(arg, bindings, ctx)?),

        Expression::Exists(handle) => {
            let probe = ctx.exists_probe().ok_or(ThinError)?;
            probe
                .probe(*handle, ExistsMode::Exists, bindings)
                .map(|b| Literal::Boolean(b.into()))
        }
        Expression::NotExists(handle) => {
            let probe = ctx.exists_probe().ok_or(ThinError)?;
            probe
                .probe(*handle, ExistsMode::NotExists, bindings)
                .map(|b| Literal::Boolean(b.into()))
        }

        Expression::Aggregate(_) => {
            tracing::debug!("aggregate expression reached the scalar evaluator");
            ThinError::expected()
        }
    }
}

fn flatten(lit: &Literal, bindings: &Arc<Bindings>) -> ThinResult<Literal> {
    match lit {
        Literal::Variable(offset, _) => bindings.get(*offset).cloned().ok_or(ThinError),
        other => Ok(other.clone()),
    }
}

fn eval_bool(
    expr: &Expression,
    bindings: &Arc<Bindings>,
    ctx: &EvaluationContext<'_>,
) -> ThinResult<bool> {
    bool::try_from(&evaluate(expr, bindings, ctx)?)
}

/// Three-valued AND (§4.2): if both sides error, error; if exactly one errors and the
/// other is `false`, the result is `false`; if one errors and the other is `true`,
/// error.
fn eval_and(
    l: &Expression,
    r: &Expression,
    bindings: &Arc<Bindings>,
    ctx: &EvaluationContext<'_>,
) -> ThinResult<Literal> {
    let left = eval_bool(l, bindings, ctx);
    let right = eval_bool(r, bindings, ctx);
    let result = match (left, right) {
        (Ok(l), Ok(r)) => Ok(l && r),
        (Ok(false), Err(_)) | (Err(_), Ok(false)) => Ok(false),
        (Ok(true), Err(_)) | (Err(_), Ok(true)) => Err(ThinError),
        (Err(_), Err(_)) => Err(ThinError),
    };
    result.map(|b| Literal::Boolean(b.into()))
}

/// Three-valued OR: symmetric with `true` dominating.
fn eval_or(
    l: &Expression,
    r: &Expression,
    bindings: &Arc<Bindings>,
    ctx: &EvaluationContext<'_>,
) -> ThinResult<Literal> {
    let left = eval_bool(l, bindings, ctx);
    let right = eval_bool(r, bindings, ctx);
    let result = match (left, right) {
        (Ok(l), Ok(r)) => Ok(l || r),
        (Ok(true), Err(_)) | (Err(_), Ok(true)) => Ok(true),
        (Ok(false), Err(_)) | (Err(_), Ok(false)) => Err(ThinError),
        (Err(_), Err(_)) => Err(ThinError),
    };
    result.map(|b| Literal::Boolean(b.into()))
}

fn eval_cmp(
    l: &Expression,
    r: &Expression,
    bindings: &Arc<Bindings>,
    ctx: &EvaluationContext<'_>,
    accept: impl FnOnce(std::cmp::Ordering) -> bool,
) -> ThinResult<Literal> {
    let l = evaluate(l, bindings, ctx)?;
    let r = evaluate(r, bindings, ctx)?;
    let ordering = compare_values(&l, &r)?;
    Ok(Literal::Boolean(accept(ordering).into()))
}

/// Value-level comparison (§3/§4.2): numeric promotion across `Integer`/`Decimal`/
/// `Double`, URI string equality, byte equality for strings honoring datatype and
/// language, field-by-field for datetimes. Types that cannot be compared are an error.
fn compare_values(l: &Literal, r: &Literal) -> ThinResult<std::cmp::Ordering> {
    match (l, r) {
        (Literal::Uri(a), Literal::Uri(b)) => Ok(a.as_str().cmp(b.as_str())),
        (Literal::Blank(a), Literal::Blank(b)) => Ok(a.as_str().cmp(b.as_str())),
        (Literal::PlainString(a, la), Literal::PlainString(b, lb)) => {
            if la.as_deref().map(str::to_ascii_lowercase) != lb.as_deref().map(str::to_ascii_lowercase) {
                return ThinError::expected();
            }
            Ok(a.as_ref().cmp(b.as_ref()))
        }
        (Literal::TypedString(a, da), Literal::TypedString(b, db)) if da == db => {
            Ok(a.as_ref().cmp(b.as_ref()))
        }
        (Literal::Boolean(a), Literal::Boolean(b)) => Ok(bool::from(*a).cmp(&bool::from(*b))),
        (Literal::DateTime(a), Literal::DateTime(b)) => {
            a.partial_cmp(b).ok_or(ThinError)
        }
        (a, b) => {
            let na = Numeric::from_literal(a)?;
            let nb = Numeric::from_literal(b)?;
            na.partial_cmp(&nb).ok_or(ThinError)
        }
    }
}

fn eval_in(
    needle: &Expression,
    haystack: &[Expression],
    bindings: &Arc<Bindings>,
    ctx: &EvaluationContext<'_>,
    negate: bool,
) -> ThinResult<Literal> {
    let needle = evaluate(needle, bindings, ctx)?;
    let mut saw_error = false;
    for candidate in haystack {
        match evaluate(candidate, bindings, ctx) {
            Ok(candidate) => match compare_values(&needle, &candidate) {
                Ok(std::cmp::Ordering::Equal) => {
                    return Ok(Literal::Boolean((!negate).into()));
                }
                Ok(_) => {}
                Err(_) => saw_error = true,
            },
            Err(_) => saw_error = true,
        }
    }
    if saw_error {
        ThinError::expected()
    } else {
        Ok(Literal::Boolean(negate.into()))
    }
}

fn eval_arith(
    l: &Expression,
    r: &Expression,
    bindings: &Arc<Bindings>,
    ctx: &EvaluationContext<'_>,
    int_op: impl FnOnce(oxsdatatypes::Integer, oxsdatatypes::Integer) -> Option<oxsdatatypes::Integer>,
    dec_op: impl FnOnce(oxsdatatypes::Decimal, oxsdatatypes::Decimal) -> Option<oxsdatatypes::Decimal>,
    dbl_op: impl FnOnce(oxsdatatypes::Double, oxsdatatypes::Double) -> oxsdatatypes::Double,
) -> ThinResult<Literal> {
    let l = evaluate(l, bindings, ctx)?;
    let r = evaluate(r, bindings, ctx)?;
    checked_numeric_op(&l, &r, int_op, dec_op, dbl_op)
}

fn numeric_as_i64(lit: &Literal) -> ThinResult<i64> {
    match Numeric::from_literal(lit)? {
        Numeric::Integer(i) => Ok(i.into()),
        Numeric::Decimal(d) => Ok(f64::from(d) as i64),
        Numeric::Double(d) => Ok(f64::from(d) as i64),
    }
}

/// Extracts `(lexical value, language tag)` for the string-family operators, which
/// only accept simple literals, `xsd:string`-typed literals, and language-tagged
/// strings (SPARQL 1.1 §17.4.3).
fn string_value(lit: &Literal) -> ThinResult<(Arc<str>, Option<Arc<str>>)> {
    match lit {
        Literal::PlainString(v, lang) => Ok((v.clone(), lang.clone())),
        Literal::TypedString(v, dt) if dt.as_str() == oxrdf::vocab::xsd::STRING.as_str() => {
            Ok((v.clone(), None))
        }
        _ => ThinError::expected(),
    }
}

fn plain_or_lang(value: Arc<str>, lang: Option<Arc<str>>) -> Literal {
    match lang {
        Some(lang) => Literal::PlainString(value, Some(lang)),
        None => Literal::PlainString(value, None),
    }
}

fn compile_regex(pattern: &str, flags: Option<&str>) -> ThinResult<regex::Regex> {
    let mut builder = regex::RegexBuilder::new(pattern);
    if let Some(flags) = flags {
        for flag in flags.chars() {
            match flag {
                'i' => {
                    builder.case_insensitive(true);
                }
                's' => {
                    builder.dot_matches_new_line(true);
                }
                'm' => {
                    builder.multi_line(true);
                }
                'x' => {
                    builder.ignore_whitespace(true);
                }
                _ => return ThinError::expected(),
            }
        }
    }
    builder.build().map_err(|_| ThinError)
}

fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

fn resolve_iri(ctx: &EvaluationContext<'_>, value: &str) -> ThinResult<Literal> {
    let resolved = match ctx.base_iri() {
        Some(base) => {
            let base = oxiri::Iri::parse(base.to_string()).map_err(|_| ThinError)?;
            base.resolve(value).map_err(|_| ThinError)?.into_inner()
        }
        None => value.to_string(),
    };
    sparq_model::NamedNode::new(resolved)
        .map(Literal::Uri)
        .map_err(ThinError::from)
}

fn date_part(
    e: &Expression,
    bindings: &Arc<Bindings>,
    ctx: &EvaluationContext<'_>,
    part: impl FnOnce(oxsdatatypes::DateTime) -> i64,
) -> ThinResult<Literal> {
    match evaluate(e, bindings, ctx)? {
        Literal::DateTime(d) => Ok(Literal::Integer(part(d).into())),
        _ => ThinError::expected(),
    }
}

fn fresh_uuid(ctx: &EvaluationContext<'_>) -> String {
    let bits = ctx.next_u128();
    uuid::Builder::from_u128(bits)
        .with_version(uuid::Version::Random)
        .with_variant(uuid::Variant::RFC4122)
        .into_uuid()
        .to_string()
}

fn hash_of(
    e: &Expression,
    bindings: &Arc<Bindings>,
    ctx: &EvaluationContext<'_>,
    hasher: impl FnOnce(&str) -> String,
) -> ThinResult<Literal> {
    let (v, _) = string_value(&evaluate(e, bindings, ctx)?)?;
    Ok(Literal::plain(hasher(&v)))
}
