use crate::expression::ast::{Aspect, Expr, Literal, Reference, Sigil};
use crate::foundation::core::{class_reference, layer_reference, object_reference};
use crate::foundation::error::TimelineResult;
use crate::interval::Operand;
use crate::interval::events::clean_instances;
use crate::interval::ops::{combine_boolean, invert_instances, operate_on_arrays};
use crate::model::instance::{ScalarValue, TimelineInstance};
use crate::model::resolved::ObjIdx;
use crate::resolve::resolver::Resolver;

impl Resolver {
    /// Evaluate an expression tree in the given context.
    ///
    /// `Ok(None)` means "no value": an empty expression, an unknown word, a reference that
    /// selects nothing. No value on either side of a binary operator makes the whole operator
    /// valueless.
    pub(crate) fn lookup(
        &mut self,
        expr: Option<&Expr>,
        aspect: Aspect,
    ) -> TimelineResult<Option<Operand>> {
        let Some(expr) = expr else {
            return Ok(None);
        };
        match expr {
            Expr::Literal(Literal::Number(v)) => Ok(Some(Operand::Scalar(ScalarValue::constant(*v)))),
            Expr::Literal(Literal::True) => Ok(Some(Operand::Scalar(ScalarValue::constant(0.0)))),
            Expr::Literal(Literal::False) => Ok(Some(Operand::Instances(Vec::new()))),
            Expr::Literal(Literal::Word(_)) => Ok(None),
            Expr::Reference(reference) => self.lookup_reference(reference, aspect),
            Expr::Not(inner) => Ok(match self.lookup(Some(inner), aspect)? {
                Some(Operand::Instances(list)) if !list.is_empty() => {
                    Some(Operand::Instances(invert_instances(&list, &mut self.ids)))
                }
                other => other,
            }),
            Expr::Binary { op, left, right } => {
                let left = self.lookup(Some(left), aspect)?;
                let right = self.lookup(Some(right), aspect)?;
                let (Some(left), Some(right)) = (left, right) else {
                    return Ok(None);
                };
                if op.is_boolean() {
                    Ok(Some(Operand::Instances(combine_boolean(
                        left,
                        right,
                        *op,
                        &mut self.ids,
                    ))))
                } else {
                    Ok(Some(operate_on_arrays(&left, &right, *op, &mut self.ids)))
                }
            }
        }
    }

    fn targets(&self, reference: &Reference) -> Vec<ObjIdx> {
        let ids: Vec<&String> = match reference.sigil {
            Sigil::Object => vec![&reference.name],
            Sigil::Class => self
                .graph
                .classes
                .get(&reference.name)
                .map(|ids| ids.iter().collect())
                .unwrap_or_default(),
            Sigil::Layer => self
                .graph
                .layers
                .get(&reference.name)
                .map(|ids| ids.iter().collect())
                .unwrap_or_default(),
        };
        ids.into_iter().filter_map(|id| self.graph.lookup(id)).collect()
    }

    /// `#id`, `.class` or `$layer`, in the explicit aspect if the reference names one.
    fn lookup_reference(
        &mut self,
        reference: &Reference,
        context: Aspect,
    ) -> TimelineResult<Option<Operand>> {
        let targets = self.targets(reference);
        if targets.is_empty() {
            return Ok(None);
        }
        let selector = match reference.sigil {
            Sigil::Object => object_reference(&reference.name),
            Sigil::Class => class_reference(&reference.name),
            Sigil::Layer => layer_reference(&reference.name),
        };

        let aspect = reference.aspect.unwrap_or(context);
        if aspect == Aspect::Duration {
            let mut shortest: Option<ScalarValue> = None;
            for idx in targets {
                self.resolve_object(idx)?;
                let object = self.graph.get(idx);
                let Some(first) = object.resolved.instances.first() else {
                    continue;
                };
                let Some(duration) = first.duration() else {
                    continue;
                };
                if shortest.as_ref().is_none_or(|s| duration < s.value) {
                    let mut references = first.references.clone();
                    references.insert(object_reference(&object.id));
                    references.insert(selector.clone());
                    shortest = Some(ScalarValue {
                        value: duration,
                        references,
                    });
                }
            }
            return Ok(shortest.map(Operand::Scalar));
        }

        let mut all: Vec<TimelineInstance> = Vec::new();
        for idx in targets {
            self.resolve_object(idx)?;
            let object = self.graph.get(idx);
            let own = object_reference(&object.id);
            all.extend(object.resolved.instances.iter().map(|instance| {
                let mut instance = instance.clone();
                instance.references.insert(own.clone());
                instance.references.insert(selector.clone());
                instance
            }));
        }
        if all.is_empty() {
            return Ok(Some(Operand::Instances(all)));
        }

        let list = if aspect == Aspect::End {
            let mut inverted = invert_instances(&all, &mut self.ids);
            // The lead gap of an inversion starts at zero, which is not an end time.
            if inverted.first().is_some_and(|i| i.start == 0.0) {
                inverted.remove(0);
            }
            inverted
        } else {
            clean_instances(&all, true, true, &mut self.ids)
        };
        Ok(Some(Operand::Instances(list)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resolve/lookup.rs"]
mod tests;
