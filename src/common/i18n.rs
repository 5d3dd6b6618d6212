// src/common/i18n.rs

use std::collections::HashMap;

const DEFAULT_LANG: &str = "en";

// Mensagens estáticas por idioma. Chave ausente cai para o inglês e, por fim, para a própria chave.
const EN: &[(&str, &str)] = &[
    ("error.validation", "One or more fields are invalid."),
    ("error.not_found", "Record not found."),
    ("error.forbidden", "You are not allowed to perform this action."),
    ("error.precedence", "The previous approval stage must be approved first."),
    ("error.invalid_state", "This operation is not allowed in the record's current state."),
    ("error.business_rule", "The request violates a business rule."),
    ("error.email_exists", "This e-mail is already in use."),
    ("error.duplicate", "A record with the same value already exists."),
    ("error.invalid_credentials", "Invalid e-mail or password."),
    ("error.invalid_token", "Authentication token is invalid or missing."),
    ("error.user_inactive", "User is inactive."),
    ("error.internal", "An unexpected error occurred."),
    ("validation.required", "This field is required."),
    ("validation.invalid_email", "The e-mail provided is invalid."),
    ("validation.password_too_short", "The password must have at least 6 characters."),
    ("validation.too_long", "The value is too long."),
    ("validation.invalid_code", "The code must have between 1 and 16 characters."),
    ("validation.invalid_date_range", "The end date must not be before the start date."),
    ("validation.invalid_number_of_days", "The number of days must be positive."),
    ("reason.already_finalized", "The approval workflow is already finalized."),
    ("reason.concurrent_update", "The record was changed by someone else. Reload and try again."),
    ("reason.stage_already_approved", "This stage is already approved."),
    ("reason.already_checked_in", "Already checked in."),
    ("reason.already_checked_out", "Already checked out."),
    ("reason.check_in_required", "You must check in first."),
    ("reason.visit_cancelled", "The visit is cancelled."),
    ("reason.visit_already_cancelled", "The visit is already cancelled."),
    ("reason.visit_completed", "The visit is already completed."),
    ("reason.invalid_executive", "The selected user is not an active executive."),
    ("reason.invalid_sub_master", "Invalid expense sub-master."),
    ("reason.invalid_quantity", "Quantity must not be negative."),
    ("reason.invalid_rate", "Rate must not be negative."),
    ("reason.invalid_file_name", "Invalid file name."),
    ("reason.cannot_deactivate_self", "You cannot deactivate your own account."),
    ("reason.invalid_manager", "The reporting manager must be an active manager."),
];

const PT: &[(&str, &str)] = &[
    ("error.validation", "Um ou mais campos são inválidos."),
    ("error.not_found", "Registro não encontrado."),
    ("error.forbidden", "Você não tem permissão para realizar esta ação."),
    ("error.precedence", "A etapa de aprovação anterior precisa ser aprovada primeiro."),
    ("error.invalid_state", "Esta operação não é permitida no estado atual do registro."),
    ("error.business_rule", "A requisição viola uma regra de negócio."),
    ("error.email_exists", "Este e-mail já está em uso."),
    ("error.duplicate", "Já existe um registro com este valor."),
    ("error.invalid_credentials", "E-mail ou senha inválidos."),
    ("error.invalid_token", "Token de autenticação inválido ou ausente."),
    ("error.user_inactive", "Usuário inativo."),
    ("error.internal", "Ocorreu um erro inesperado."),
    ("validation.required", "Este campo é obrigatório."),
    ("validation.invalid_email", "O e-mail fornecido é inválido."),
    ("validation.password_too_short", "A senha deve ter no mínimo 6 caracteres."),
    ("validation.too_long", "O valor é longo demais."),
    ("validation.invalid_code", "O código deve ter entre 1 e 16 caracteres."),
    ("validation.invalid_date_range", "A data final não pode ser anterior à inicial."),
    ("validation.invalid_number_of_days", "O número de dias deve ser positivo."),
    ("reason.already_finalized", "O fluxo de aprovação já foi finalizado."),
    ("reason.concurrent_update", "O registro foi alterado por outra pessoa. Recarregue e tente novamente."),
    ("reason.stage_already_approved", "Esta etapa já foi aprovada."),
    ("reason.already_checked_in", "Check-in já realizado."),
    ("reason.already_checked_out", "Check-out já realizado."),
    ("reason.check_in_required", "Faça o check-in primeiro."),
    ("reason.visit_cancelled", "A visita está cancelada."),
    ("reason.visit_already_cancelled", "A visita já foi cancelada."),
    ("reason.visit_completed", "A visita já foi concluída."),
    ("reason.invalid_executive", "O usuário selecionado não é um executivo ativo."),
    ("reason.invalid_sub_master", "Subcategoria de despesa inválida."),
    ("reason.invalid_quantity", "A quantidade não pode ser negativa."),
    ("reason.invalid_rate", "A tarifa não pode ser negativa."),
    ("reason.invalid_file_name", "Nome de arquivo inválido."),
    ("reason.cannot_deactivate_self", "Você não pode desativar a sua própria conta."),
    ("reason.invalid_manager", "O gestor informado precisa ser um gestor ativo."),
];

#[derive(Debug, Clone)]
pub struct I18nStore {
    messages: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut messages = HashMap::new();
        messages.insert("en", EN.iter().copied().collect());
        messages.insert("pt", PT.iter().copied().collect());
        Self { messages }
    }

    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.lookup(lang, key)
            .or_else(|| self.lookup(DEFAULT_LANG, key))
            .unwrap_or(key)
            .to_string()
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&'static str> {
        self.messages.get(lang).and_then(|m| m.get(key)).copied()
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_english_then_to_key() {
        let store = I18nStore::new();
        assert_eq!(store.translate("pt", "error.forbidden"), "Você não tem permissão para realizar esta ação.");
        assert_eq!(store.translate("de", "error.forbidden"), "You are not allowed to perform this action.");
        assert_eq!(store.translate("en", "error.unknown"), "error.unknown");
    }
}
