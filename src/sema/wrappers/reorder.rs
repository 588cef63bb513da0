// src/sema/wrappers/reorder.rs
//
// Permute a call's actuals into the callee's formal order. Stable and in
// place: when the orders already agree nothing is touched. The call-info
// arrays are permuted alongside the call's argument list so every
// downstream stage sees one consistent ordering.

use crate::frontend::{ArgId, FnId};
use crate::sema::call_info::CallInfo;
use crate::sema::host::ResolveHost;

use super::CallAdapter;

impl<H: ResolveHost> CallAdapter<'_, H> {
    pub(crate) fn reorder_actuals(
        &mut self,
        callee: FnId,
        info: &mut CallInfo,
        actual_to_formal: &[ArgId],
    ) {
        let num_args = actual_to_formal.len();
        let formals = self.graph.func(callee).formals.clone();
        let mut formal_to_actual = vec![0usize; num_args];
        let mut need_to_reorder = false;

        for (i, &formal) in formals.iter().enumerate() {
            for (j, &target) in actual_to_formal.iter().enumerate() {
                if target == formal {
                    if i != j {
                        need_to_reorder = true;
                    }
                    formal_to_actual[i] = j;
                }
            }
        }

        if !need_to_reorder {
            return;
        }

        // Pull every actual off the call, then reinsert in formal order.
        let saved = self.graph.call_actuals(info.call);
        for &actual in &saved {
            self.graph.remove(actual);
        }
        for i in 0..num_args {
            self.graph.add_actual(info.call, saved[formal_to_actual[i]]);
        }

        assert_eq!(info.actuals.len(), num_args);
        let saved_syms = info.actuals.clone();
        let saved_names = info.actual_names.clone();
        for i in 0..num_args {
            info.actuals[i] = saved_syms[formal_to_actual[i]];
            info.actual_names[i] = saved_names[formal_to_actual[i]];
        }
    }
}
