use crate::define_string_enum;

define_string_enum! {
    /// 学前班级：小班 / 中班（LKG）/ 大班（UKG）
    #[ts(export, export_to = "../frontend/src/types/generated/common.ts")]
    ClassLevel, "班级" {
        Nursery => "nursery",
        Lkg => "lkg",
        Ukg => "ukg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        assert_eq!("lkg".parse::<ClassLevel>().unwrap(), ClassLevel::Lkg);
        assert_eq!(ClassLevel::Ukg.to_string(), "ukg");
        assert_eq!(ClassLevel::ALL.len(), 3);
    }

    #[test]
    fn test_deserialize_rejects_unknown() {
        let err = serde_json::from_str::<ClassLevel>(r#""grade1""#).unwrap_err();
        assert!(err.to_string().contains("nursery, lkg, ukg"));

        let level: ClassLevel = serde_json::from_str(r#""nursery""#).unwrap();
        assert_eq!(level, ClassLevel::Nursery);
        assert_eq!(serde_json::to_string(&level).unwrap(), r#""nursery""#);
    }
}
